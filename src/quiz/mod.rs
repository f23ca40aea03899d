//! Quiz content
//!
//! Questions arrive from a remote source as JSON, are decoded once per
//! session and never change afterwards.

mod error;
pub mod question;

pub use error::QuizError;
pub use question::{AnswerOption, Question, SignSide, parse_questions};

/// Fetch and decode the question list (browser only)
#[cfg(target_arch = "wasm32")]
pub async fn fetch_questions(url: &str) -> Result<Vec<Question>, QuizError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fetch_err = |e: wasm_bindgen::JsValue| QuizError::Fetch(format!("{:?}", e));

    let window = web_sys::window().ok_or_else(|| QuizError::Fetch("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fetch_err)?;
    let response: web_sys::Response = response.dyn_into().map_err(fetch_err)?;
    if !response.ok() {
        return Err(QuizError::Fetch(format!(
            "{} returned HTTP {}",
            url,
            response.status()
        )));
    }

    let text = JsFuture::from(response.text().map_err(fetch_err)?)
        .await
        .map_err(fetch_err)?
        .as_string()
        .ok_or_else(|| QuizError::Fetch("response body is not text".into()))?;

    parse_questions(&text)
}
