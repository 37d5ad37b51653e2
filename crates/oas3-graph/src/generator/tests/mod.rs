mod models;
mod support;
