mod check;
mod grade;
mod expressions;
mod server;
