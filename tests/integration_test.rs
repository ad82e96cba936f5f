mod common;
mod replset_lifecycle;
