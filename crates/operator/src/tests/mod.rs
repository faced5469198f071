
mod run_loop;
