//! UserStore integration tests

mod save_load;
