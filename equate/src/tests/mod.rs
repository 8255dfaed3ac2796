

mod grading;
