mod cancel;
mod cross_partition;
mod invalid_request;
