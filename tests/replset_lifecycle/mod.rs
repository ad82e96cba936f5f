mod failover_test;
mod start_stop_test;
