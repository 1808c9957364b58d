mod bureau;
mod common;
mod service;
