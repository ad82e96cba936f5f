pub(crate) mod async_task;

#[cfg(test)]
mod async_task_test;
