// Browser tests, run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use repeat_game::Difficulty;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlDocument;

wasm_bindgen_test_configure!(run_in_browser);

fn html_document() -> HtmlDocument {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.dyn_into::<HtmlDocument>().ok())
        .expect("html document")
}

#[wasm_bindgen_test]
fn mount_reports_missing_page_elements() {
    // the test harness page has none of the game's controls
    assert!(repeat_game::web::mount().is_err());
    assert!(repeat_game::start_game().is_err());
}

#[wasm_bindgen_test]
fn difficulty_cookie_survives_the_browser() {
    let doc = html_document();
    doc.set_cookie(&Difficulty::Hard.to_cookie()).unwrap();
    let cookie = doc.cookie().unwrap();
    assert_eq!(Difficulty::from_cookie(&cookie).levels(), 32);
}

#[wasm_bindgen_test]
fn entropy_is_available_in_the_browser() {
    assert!(repeat_game::RandomNotes::from_entropy().is_ok());
}
