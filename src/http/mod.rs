//! HTTP protocol layer module
//!
//! MIME lookup and response builders, decoupled from routing decisions.

pub mod mime;
pub mod response;

pub use mime::{content_type_for, content_type_for_path};
pub use response::{
    build_404_response, build_413_response, build_500_response, build_file_response,
    build_html_response, build_json_response, build_no_content_response, build_text_response,
    HttpResponse,
};
