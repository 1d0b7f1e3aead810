pub mod errors;
pub mod html;
pub mod redirect;

pub use errors::{error_to_response, ResultResp};

pub use html::{html_response, html_response_with_status};
pub use redirect::{clear_session_cookie, no_content, redirect, redirect_with_cookie, session_cookie};
