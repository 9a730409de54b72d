mod chown;
