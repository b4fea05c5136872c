use core::fmt;
use serde::{Deserialize, Serialize};

/// Names the fields a view struct needs selected out of its table.
pub trait ViewFieldSelector {
    fn get_select_query_fields() -> String;
}

pub struct Pagination {
    pub order_dir: Option<QryOrder>,
    pub count: i8,
    pub start: i32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            order_dir: None,
            count: 20,
            start: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum QryOrder {
    DESC,
    ASC,
}

impl fmt::Display for QryOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QryOrder::DESC => write!(f, "DESC"),
            QryOrder::ASC => write!(f, "ASC"),
        }
    }
}
