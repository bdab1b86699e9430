mod auth_test;
mod helpers;
mod router_test;
mod workorder_test;
