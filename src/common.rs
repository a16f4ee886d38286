pub mod competencia;
pub mod db_utils;
pub mod error;
pub mod import;
pub mod valor;
