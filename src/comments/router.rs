//! Maps `(method, path)` pairs to comment operations.
//!
//! | method | path               | route        |
//! |--------|--------------------|--------------|
//! | GET    | `/comments`        | `List`       |
//! | POST   | `/comments/make`   | `Create`     |
//! | PATCH  | `/comments/delete` | `SoftDelete` |
//! | PATCH  | `/comments/change` | `Update`     |

use crate::comments::error::{RequestError, RequestResult};
use crate::protocol::Method;

pub const LIST_PATH: &str = "/comments";
pub const CREATE_PATH: &str = "/comments/make";
pub const DELETE_PATH: &str = "/comments/delete";
pub const CHANGE_PATH: &str = "/comments/change";

/// The four comment operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    List,
    Create,
    SoftDelete,
    Update,
}

/// Resolves a route. Methods are checked before paths, so an unknown
/// method is reported even when the path exists.
pub fn route(method: &Method, path: &str) -> RequestResult<Route> {
    let found = if *method == Method::GET {
        match path {
            LIST_PATH => Some(Route::List),
            _ => None,
        }
    } else if *method == Method::POST {
        match path {
            CREATE_PATH => Some(Route::Create),
            _ => None,
        }
    } else if *method == Method::PATCH {
        match path {
            DELETE_PATH => Some(Route::SoftDelete),
            CHANGE_PATH => Some(Route::Update),
            _ => None,
        }
    } else {
        return Err(RequestError::UnknownMethod(method.as_str().to_string()));
    };

    found.ok_or_else(|| RequestError::UnknownPath {
        method: method.as_str().to_string(),
        path: path.to_string(),
    })
}
