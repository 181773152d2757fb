//! Pipeline stages for question extraction.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested alone and the rendering backend or model client can be swapped
//! without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ llm ──▶ postprocess
//! (path)    (pdfium)   (base64)   (VLM)   (fence strip + parse)
//! ```
//!
//! 1. [`input`]  — check the path is a readable PDF
//! 2. [`render`] — rasterise one page at 2× through the [`render::PageSource`] trait
//! 3. [`encode`] — PNG-encode and base64-wrap the page image
//! 4. [`llm`]    — one chat-completions call per page; failures become an
//!    empty result
//! 5. [`postprocess`] — strip code fences and parse the JSON question array

pub mod encode;
pub mod input;
pub mod llm;
pub mod postprocess;
pub mod render;
