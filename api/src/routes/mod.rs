pub mod coach;
pub mod health_route;
