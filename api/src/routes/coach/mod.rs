pub mod advice_request;
pub mod advice_route;
