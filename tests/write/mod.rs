mod buffer_and_stream;
mod checksum;
