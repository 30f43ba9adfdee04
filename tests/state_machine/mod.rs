mod course_run_state_machine;
mod course_state_machine;
