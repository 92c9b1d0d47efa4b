//! DOM side of the puzzle modal and the HUD counters.
//!
//! Pages may ship their own markup with the ids below; otherwise a plain
//! overlay is created on first start.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

use crate::riddle::{CHOICE_COUNT, choice_label};
use crate::session::ActivePuzzle;

pub const MODAL_ID: &str = "puzzle-modal";
const LEVEL_ID: &str = "puzzle-level";
const QUESTION_ID: &str = "puzzle-question";
const FEEDBACK_ID: &str = "puzzle-feedback";
const HINT_ID: &str = "riddle-hint";

fn choice_id(index: usize) -> String {
    format!("choice-{index}")
}

fn set_display(el: &Element, value: &str) {
    if let Some(h) = el.dyn_ref::<HtmlElement>() {
        let _ = h.style().set_property("display", value);
    }
}

fn listen(el: &Element, handler: impl FnMut() + 'static) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Build the modal unless the page already has one.
pub fn ensure(doc: &Document) -> Result<(), JsValue> {
    if doc.get_element_by_id(MODAL_ID).is_some() {
        return Ok(());
    }
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let modal = doc.create_element("div")?;
    modal.set_id(MODAL_ID);
    modal.set_attribute("style", "position:fixed; inset:0; display:none; align-items:center; justify-content:center; background:rgba(0,0,0,0.55); z-index:50; font-family:Arial, sans-serif;").ok();

    let panel = doc.create_element("div")?;
    panel.set_attribute("style", "background:#fffbe6; border:3px solid #8B4513; border-radius:12px; padding:18px 22px; max-width:520px; color:#222;").ok();

    let title = doc.create_element("h3")?;
    title.set_inner_html(&format!("🐉 Level <span id=\"{LEVEL_ID}\">1</span> Riddle"));
    panel.append_child(&title)?;

    let question = doc.create_element("p")?;
    question.set_id(QUESTION_ID);
    panel.append_child(&question)?;

    let hint = doc.create_element("div")?;
    hint.set_id(HINT_ID);
    hint.set_attribute("style", "display:none; font-size:13px; color:#6b4f00; margin-bottom:8px;").ok();
    panel.append_child(&hint)?;

    for i in 0..CHOICE_COUNT {
        let button = doc.create_element("button")?;
        button.set_id(&choice_id(i));
        button.set_class_name("choice-button");
        button.set_attribute("style", "display:block; width:100%; margin:4px 0; padding:6px; text-align:left;").ok();
        listen(&button, move || super::select_answer(i))?;
        panel.append_child(&button)?;
    }

    let feedback = doc.create_element("div")?;
    feedback.set_id(FEEDBACK_ID);
    feedback.set_attribute("style", "min-height:22px; margin:8px 0; font-weight:bold;").ok();
    panel.append_child(&feedback)?;

    let submit = doc.create_element("button")?;
    submit.set_text_content(Some("Submit (Enter)"));
    listen(&submit, super::submit_selected_answer)?;
    panel.append_child(&submit)?;

    let skip = doc.create_element("button")?;
    skip.set_text_content(Some("Skip (-50)"));
    skip.set_attribute("style", "margin-left:8px;").ok();
    listen(&skip, super::skip_puzzle)?;
    panel.append_child(&skip)?;

    modal.append_child(&panel)?;
    body.append_child(&modal)?;
    Ok(())
}

pub fn show(doc: &Document, level: u32, puzzle: &ActivePuzzle) {
    if let Some(el) = doc.get_element_by_id(LEVEL_ID) {
        el.set_text_content(Some(&level.to_string()));
    }
    if let Some(el) = doc.get_element_by_id(QUESTION_ID) {
        el.set_text_content(Some(&puzzle.riddle.question));
    }
    if let Some(el) = doc.get_element_by_id(HINT_ID) {
        match &puzzle.hint {
            Some(h) => {
                el.set_text_content(Some(&format!("💭 {}", h.message())));
                set_display(&el, "block");
            }
            None => {
                el.set_text_content(None);
                set_display(&el, "none");
            }
        }
    }
    for i in 0..CHOICE_COUNT {
        let Some(el) = doc.get_element_by_id(&choice_id(i)) else {
            continue;
        };
        el.set_class_name("choice-button");
        match puzzle.riddle.choices.get(i) {
            Some(text) => {
                el.set_text_content(Some(&format!("{}) {text}", choice_label(i))));
                set_display(&el, "block");
            }
            None => set_display(&el, "none"),
        }
    }
    set_feedback(doc, "", None);
    if let Some(el) = doc.get_element_by_id(MODAL_ID) {
        set_display(&el, "flex");
    }
}

pub fn hide(doc: &Document) {
    if let Some(el) = doc.get_element_by_id(MODAL_ID) {
        set_display(&el, "none");
    }
}

pub fn mark_selected(doc: &Document, selected: usize) {
    for i in 0..CHOICE_COUNT {
        if let Some(el) = doc.get_element_by_id(&choice_id(i)) {
            let classes = el.class_list();
            let _ = if i == selected {
                classes.add_1("selected")
            } else {
                classes.remove_1("selected")
            };
        }
    }
}

/// Colour the answer buttons after a submission.
pub fn reveal(doc: &Document, correct: Option<usize>, wrong: Option<usize>) {
    for (index, class) in [(correct, "correct"), (wrong, "wrong")] {
        if let Some(el) = index.and_then(|i| doc.get_element_by_id(&choice_id(i))) {
            let _ = el.class_list().add_1(class);
        }
    }
}

pub fn set_feedback(doc: &Document, text: &str, class: Option<&str>) {
    if let Some(el) = doc.get_element_by_id(FEEDBACK_ID) {
        el.set_text_content(Some(text));
        el.set_class_name(class.unwrap_or(""));
    }
}

pub fn update_hud(doc: &Document, level: u32, score: i64, lives: u32) {
    for (id, value) in [
        ("dragon-level", level.to_string()),
        ("dragon-score", score.to_string()),
        ("dragon-lives", lives.to_string()),
    ] {
        if let Some(el) = doc.get_element_by_id(id) {
            el.set_text_content(Some(&value));
        }
    }
}
