pub mod db_utils;
pub mod error;
pub mod spanish;
pub mod qr;
