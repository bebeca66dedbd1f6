//! Custom assertion macros and utilities
//!
//! Assertions over task lists that produce readable failure output.

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert the titles of a task list, in order
#[macro_export]
macro_rules! assert_titles {
    ($tasks:expr, [$($title:expr),* $(,)?]) => {{
        let tasks = &$tasks;
        let actual: Vec<&str> = tasks.iter().map(|t| t.fields.title.as_str()).collect();
        let expected: Vec<&str> = vec![$($title),*];
        pretty_assertions::assert_eq!(actual, expected);
    }};
}

/// Assert that no task in the list still has a temporary identity
#[macro_export]
macro_rules! assert_no_temporary {
    ($tasks:expr) => {{
        let tasks = &$tasks;
        for task in tasks.iter() {
            assert!(
                !task.id.is_temporary(),
                "Task {} ({}) still has a temporary identity",
                task.id,
                task.fields.title
            );
        }
    }};
}
