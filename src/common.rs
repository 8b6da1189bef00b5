pub mod db_utils;
pub mod error;
pub mod hours;
pub mod periods;
pub mod response;
pub mod validation;
