//! C ABI for hosting the front end from C/C++, JNI or other managed runtimes.
//!
//! Every function returns an `int32_t` status (`CODEX_OK` or a negative
//! code) and never unwinds into the caller. On failure,
//! `codex_last_error()` describes the problem on the calling thread.
//!
//! The matching header is `include/codex_tts.h`.

#![allow(clippy::missing_safety_doc)]

use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::engine;
use crate::error::CodexError;
use crate::g2p::{PhonemeCategory, PhonemeToken};

// ============================================================================
// Status codes
// ============================================================================

pub const CODEX_OK: i32 = 0;
pub const CODEX_ERR_INVALID_ARGUMENT: i32 = -1;
pub const CODEX_ERR_ENCODING: i32 = -2;
pub const CODEX_ERR_MALFORMED_INPUT: i32 = -3;
pub const CODEX_ERR_NOT_INITIALIZED: i32 = -4;
pub const CODEX_ERR_INIT: i32 = -5;
pub const CODEX_ERR_INTERNAL: i32 = -6;

/// Symbol buffer size, including the terminating NUL
pub const CODEX_SYMBOL_CAPACITY: usize = 16;

// ============================================================================
// Boundary types
// ============================================================================

/// One phoneme token with an inline NUL-terminated UTF-8 symbol
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CodexPhoneme {
    pub symbol: [c_char; CODEX_SYMBOL_CAPACITY],
    pub is_emphatic: bool,
    pub duration_hint: f32,
    /// 0 = consonant, 1 = vowel, 2 = diphthong
    pub category: u8,
}

/// Token array owned by the library; release with `codex_phoneme_list_free`
#[repr(C)]
#[derive(Debug)]
pub struct CodexPhonemeList {
    pub tokens: *mut CodexPhoneme,
    pub len: usize,
}

impl CodexPhoneme {
    fn from_token(token: &PhonemeToken) -> Result<Self, String> {
        let bytes = token.symbol.as_bytes();
        if bytes.len() >= CODEX_SYMBOL_CAPACITY || bytes.contains(&0) {
            return Err(format!("symbol {:?} does not fit the C buffer", token.symbol));
        }

        let mut symbol = [0 as c_char; CODEX_SYMBOL_CAPACITY];
        for (dst, src) in symbol.iter_mut().zip(bytes) {
            *dst = *src as c_char;
        }

        Ok(Self {
            symbol,
            is_emphatic: token.is_emphatic,
            duration_hint: token.duration_hint,
            category: match token.category {
                PhonemeCategory::Consonant => 0,
                PhonemeCategory::Vowel => 1,
                PhonemeCategory::Diphthong => 2,
            },
        })
    }
}

// ============================================================================
// Error Handling
// ============================================================================

thread_local! {
    /// Last error message of the calling thread, read by `codex_last_error()`
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(message: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(message.replace('\0', " ")).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

fn fail(err: &CodexError) -> i32 {
    tracing::debug!("C call failed: {}", err);
    set_last_error(&err.to_string());
    err.status_code()
}

/// Run `f`, turning a panic into `CODEX_ERR_INTERNAL`
fn guarded<F: FnOnce() -> i32>(f: F) -> i32 {
    clear_last_error();
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(status) => status,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("Panic caught at the C boundary: {}", message);
            set_last_error(&format!("internal error: {}", message));
            CODEX_ERR_INTERNAL
        }
    }
}

/// Borrow the caller's input buffer; `len == 0` may come with a null pointer
unsafe fn input_bytes<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        Some(&[])
    } else if ptr.is_null() {
        None
    } else {
        Some(std::slice::from_raw_parts(ptr, len))
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Library version. Static string; never free it.
#[no_mangle]
pub extern "C" fn codex_engine_version() -> *const c_char {
    static VERSION_CSTRING: std::sync::OnceLock<CString> = std::sync::OnceLock::new();

    VERSION_CSTRING
        .get_or_init(|| CString::new(engine::engine_version()).unwrap_or_default())
        .as_ptr()
}

/// Initialize the engine. Returns `CODEX_OK`, or `CODEX_ERR_INIT` when the
/// configuration cannot be loaded.
#[no_mangle]
pub extern "C" fn codex_engine_init() -> i32 {
    guarded(|| match engine::engine_init() {
        Ok(()) => CODEX_OK,
        Err(e) => fail(&e),
    })
}

/// Release the engine. Idempotent, safe before init.
#[no_mangle]
pub extern "C" fn codex_engine_shutdown() {
    let _ = guarded(|| {
        engine::engine_shutdown();
        CODEX_OK
    });
}

/// Message for the last failed call on this thread, or null. Valid until
/// the next library call on the same thread.
#[no_mangle]
pub extern "C" fn codex_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(cstr) => cstr.as_ptr(),
        None => std::ptr::null(),
    })
}

// ============================================================================
// Conversion
// ============================================================================

/// Normalize `len` bytes of UTF-8 text. On success `*out` holds a
/// NUL-terminated string to release with `codex_string_free`.
#[no_mangle]
pub unsafe extern "C" fn codex_normalize(
    text: *const u8,
    len: usize,
    out: *mut *mut c_char,
) -> i32 {
    guarded(|| {
        if out.is_null() {
            set_last_error("out is null");
            return CODEX_ERR_INVALID_ARGUMENT;
        }
        *out = std::ptr::null_mut();

        let Some(bytes) = input_bytes(text, len) else {
            set_last_error("text is null but len is non-zero");
            return CODEX_ERR_INVALID_ARGUMENT;
        };

        let engine = match engine::current_engine() {
            Some(engine) => engine,
            None => return fail(&CodexError::NotInitialized),
        };
        let normalized = match engine.normalize_bytes(bytes) {
            Ok(normalized) => normalized,
            Err(e) => return fail(&e),
        };

        match CString::new(normalized) {
            Ok(cstring) => {
                *out = cstring.into_raw();
                CODEX_OK
            }
            Err(_) => {
                set_last_error("normalized text contains an interior NUL");
                CODEX_ERR_INVALID_ARGUMENT
            }
        }
    })
}

/// Convert `len` bytes of normalized UTF-8 text to phonemes. On success
/// `*out` owns a token array to release with `codex_phoneme_list_free`;
/// on failure it is left empty.
#[no_mangle]
pub unsafe extern "C" fn codex_convert(
    text: *const u8,
    len: usize,
    pausal: bool,
    out: *mut CodexPhonemeList,
) -> i32 {
    guarded(|| {
        if out.is_null() {
            set_last_error("out is null");
            return CODEX_ERR_INVALID_ARGUMENT;
        }
        *out = CodexPhonemeList {
            tokens: std::ptr::null_mut(),
            len: 0,
        };

        let Some(bytes) = input_bytes(text, len) else {
            set_last_error("text is null but len is non-zero");
            return CODEX_ERR_INVALID_ARGUMENT;
        };
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => return fail(&CodexError::from(e)),
        };

        let engine = match engine::current_engine() {
            Some(engine) => engine,
            None => return fail(&CodexError::NotInitialized),
        };
        let tokens = match engine.convert(text, pausal) {
            Ok(tokens) => tokens,
            Err(e) => return fail(&e),
        };

        let converted: Result<Vec<CodexPhoneme>, String> =
            tokens.iter().map(CodexPhoneme::from_token).collect();
        let converted = match converted {
            Ok(converted) => converted,
            Err(message) => {
                set_last_error(&message);
                return CODEX_ERR_INTERNAL;
            }
        };

        let boxed: Box<[CodexPhoneme]> = converted.into_boxed_slice();
        let len = boxed.len();
        *out = CodexPhonemeList {
            tokens: Box::into_raw(boxed) as *mut CodexPhoneme,
            len,
        };
        CODEX_OK
    })
}

// ============================================================================
// Memory release
// ============================================================================

/// Release a token array filled by `codex_convert`. Null-safe; the list is
/// reset to empty.
#[no_mangle]
pub unsafe extern "C" fn codex_phoneme_list_free(list: *mut CodexPhonemeList) {
    if list.is_null() {
        return;
    }
    let list = &mut *list;
    if !list.tokens.is_null() {
        let slice = std::ptr::slice_from_raw_parts_mut(list.tokens, list.len);
        drop(Box::from_raw(slice));
    }
    list.tokens = std::ptr::null_mut();
    list.len = 0;
}

/// Release a string returned by `codex_normalize`. Null-safe.
#[no_mangle]
pub unsafe extern "C" fn codex_string_free(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::LIFECYCLE_LOCK;
    use std::ffi::CStr;

    fn symbol(phoneme: &CodexPhoneme) -> String {
        let bytes: Vec<u8> = phoneme
            .symbol
            .iter()
            .take_while(|c| **c != 0)
            .map(|c| *c as u8)
            .collect();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_version_not_null() {
        let version = codex_engine_version();
        assert!(!version.is_null());
        let version = unsafe { CStr::from_ptr(version) }.to_str().unwrap();
        assert_eq!(version, engine::engine_version());
        // same pointer every time
        assert_eq!(codex_engine_version(), codex_engine_version());
    }

    #[test]
    fn test_init_and_shutdown() {
        let _guard = LIFECYCLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        codex_engine_shutdown();

        engine::engine_init_with(EngineConfig::default()).unwrap();
        assert_eq!(codex_engine_init(), CODEX_OK);

        codex_engine_shutdown();
        codex_engine_shutdown();
        assert!(engine::current_engine().is_none());
    }

    #[test]
    fn test_convert_round_trip() {
        let _guard = LIFECYCLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        engine::engine_init_with(EngineConfig::default()).unwrap();

        // الشَّمْسُ
        let text = "الشَّمْسُ";
        let mut list = CodexPhonemeList {
            tokens: std::ptr::null_mut(),
            len: 0,
        };
        let status = unsafe { codex_convert(text.as_ptr(), text.len(), false, &mut list) };
        assert_eq!(status, CODEX_OK);
        assert_eq!(list.len, 4);

        let tokens = unsafe { std::slice::from_raw_parts(list.tokens, list.len) };
        assert_eq!(symbol(&tokens[0]), "ʔa");
        assert_eq!(symbol(&tokens[1]), "ʃa");
        assert_eq!(tokens[1].duration_hint, 2.0);
        assert_eq!(tokens[0].category, 0);

        unsafe { codex_phoneme_list_free(&mut list) };
        assert!(list.tokens.is_null());
        assert_eq!(list.len, 0);
        // second free is a no-op
        unsafe { codex_phoneme_list_free(&mut list) };

        engine::engine_shutdown();
    }

    #[test]
    fn test_normalize_round_trip() {
        let _guard = LIFECYCLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        engine::engine_init_with(EngineConfig::default()).unwrap();

        let text = "\u{0628}\u{0640}\u{0631}";
        let mut out: *mut c_char = std::ptr::null_mut();
        let status = unsafe { codex_normalize(text.as_ptr(), text.len(), &mut out) };
        assert_eq!(status, CODEX_OK);
        let normalized = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_string();
        assert_eq!(normalized, "\u{0628}\u{0631}");
        unsafe { codex_string_free(out) };

        engine::engine_shutdown();
    }

    #[test]
    fn test_error_statuses() {
        let _guard = LIFECYCLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        engine::engine_shutdown();

        let mut list = CodexPhonemeList {
            tokens: std::ptr::null_mut(),
            len: 0,
        };
        let text = "\u{0628}";
        let status = unsafe { codex_convert(text.as_ptr(), text.len(), false, &mut list) };
        assert_eq!(status, CODEX_ERR_NOT_INITIALIZED);
        assert!(!codex_last_error().is_null());

        engine::engine_init_with(EngineConfig::default()).unwrap();

        // orphan fatha
        let text = "\u{064E}";
        let status = unsafe { codex_convert(text.as_ptr(), text.len(), false, &mut list) };
        assert_eq!(status, CODEX_ERR_MALFORMED_INPUT);
        assert!(list.tokens.is_null());
        let message = unsafe { CStr::from_ptr(codex_last_error()) }.to_str().unwrap();
        assert!(message.contains("no base letter"));

        // invalid UTF-8
        let bytes = [0xD8u8, 0xA8, 0xFF];
        let mut out: *mut c_char = std::ptr::null_mut();
        let status = unsafe { codex_normalize(bytes.as_ptr(), bytes.len(), &mut out) };
        assert_eq!(status, CODEX_ERR_ENCODING);
        assert!(out.is_null());

        // null arguments
        let status = unsafe { codex_convert(std::ptr::null(), 3, false, &mut list) };
        assert_eq!(status, CODEX_ERR_INVALID_ARGUMENT);
        let status = unsafe { codex_normalize(bytes.as_ptr(), bytes.len(), std::ptr::null_mut()) };
        assert_eq!(status, CODEX_ERR_INVALID_ARGUMENT);

        // a successful call clears the error
        let status = unsafe { codex_convert(std::ptr::null(), 0, false, &mut list) };
        assert_eq!(status, CODEX_OK);
        assert!(codex_last_error().is_null());
        unsafe { codex_phoneme_list_free(&mut list) };

        engine::engine_shutdown();
    }
}
