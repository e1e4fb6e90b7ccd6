mod setup;
mod support;
