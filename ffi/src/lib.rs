//! C-ABI wrapper around `anvil-core` for firmware hosts.
//!
//! # Overview
//! A microcontroller owns its Wi-Fi and TLS stack, so it cannot hand the
//! network to Rust. Instead it asks this library for a plain-data request,
//! executes it itself, and passes the reply back to be checked:
//!
//! ```c
//! if (anvil_wait_for_link(wifi_up, delay_ms, NULL, 20, 1000) != Ok) return;
//! AnvilClient *c = anvil_client_new(API_URL, API_KEY);
//! FfiHttpRequest *req = anvil_build_transaction(c, body);
//! /* ... POST req->url with req->headers and req->body ... */
//! FfiHttpResponse resp = { status, text };
//! FfiAnvilResult *res = anvil_parse_transaction(c, &resp);
//! ```
//!
//! # Design
//! - Every `extern "C"` body runs under `catch_unwind` so panics never cross
//!   the boundary.
//! - The caller owns every returned pointer and releases it with the matching
//!   `anvil_*_free` / `anvil_free_*` function. All of them accept null.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::time::Duration;

use anvil_core::{HttpResponse, LinkPolicy, TransactionBuildRequest};

use types::*;

/// Host callback reporting whether the network link is up.
pub type FfiLinkProbe = Option<extern "C" fn(ctx: *mut c_void) -> bool>;

/// Host callback that blocks for `ms` milliseconds.
pub type FfiDelay = Option<extern "C" fn(ms: u32, ctx: *mut c_void)>;

/// Borrow a C string as UTF-8. `None` on null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for `base_url` authenticating with `api_key`.
///
/// Returns null if either argument is null or not UTF-8.
/// Free the result with `anvil_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn anvil_client_new(
    base_url: *const c_char,
    api_key: *const c_char,
) -> *mut FfiAnvilClient {
    catch_unwind(|| {
        let (Some(url), Some(key)) = (unsafe { str_arg(base_url) }, unsafe { str_arg(api_key) }) else {
            return std::ptr::null_mut();
        };
        let client = anvil_core::AnvilClient::new(url, key);
        Box::into_raw(Box::new(FfiAnvilClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `anvil_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn anvil_client_free(client: *mut FfiAnvilClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a transaction-build request around a pre-serialized JSON body.
/// The body is sent exactly as given.
///
/// Returns null if any argument is null or not UTF-8.
/// Free the result with `anvil_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn anvil_build_transaction(
    client: *const FfiAnvilClient,
    body: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let Some(body) = (unsafe { str_arg(body) }) else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_raw_transaction(body))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a transaction-build request paying `lovelace` to `address` with
/// change returned to `change_address`.
///
/// Returns null if any pointer argument is null or not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn anvil_build_payment(
    client: *const FfiAnvilClient,
    change_address: *const c_char,
    address: *const c_char,
    lovelace: u64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let (Some(change), Some(address)) =
            (unsafe { str_arg(change_address) }, unsafe { str_arg(address) })
        else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        let input = TransactionBuildRequest::single_payment(change, address, lovelace);
        match client.inner.build_transaction(&input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a submit request for the hex transaction returned by the build
/// endpoint, with `signatures_len` hex witness sets read from `signatures`.
/// `signatures` may be null only when `signatures_len` is 0.
///
/// Returns null if any pointer argument is null or not UTF-8.
/// Free the result with `anvil_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn anvil_build_submit(
    client: *const FfiAnvilClient,
    transaction_hex: *const c_char,
    signatures: *const *const c_char,
    signatures_len: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let Some(transaction) = (unsafe { str_arg(transaction_hex) }) else {
            return std::ptr::null_mut();
        };
        let raw: &[*const c_char] = match (signatures.is_null(), signatures_len) {
            (_, 0) => &[],
            (true, _) => return std::ptr::null_mut(),
            (false, n) => unsafe { std::slice::from_raw_parts(signatures, n as usize) },
        };
        let Some(signatures) = raw
            .iter()
            .map(|&ptr| unsafe { str_arg(ptr) }.map(str::to_string))
            .collect::<Option<Vec<_>>>()
        else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        match client.inner.build_submit(transaction, &signatures) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a health-check request. Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn anvil_build_health(client: *const FfiAnvilClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_health())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Copy a host response into a core `HttpResponse`. `None` if the body is
/// not UTF-8.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> Option<HttpResponse> {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }.to_str().ok()?.to_string()
    };
    Some(HttpResponse {
        status: resp.status,
        body,
    })
}

fn parse_with<F>(
    client: *const FfiAnvilClient,
    response: *const FfiHttpResponse,
    parse: F,
) -> *mut FfiAnvilResult
where
    F: FnOnce(&anvil_core::AnvilClient, HttpResponse) -> Result<String, anvil_core::ApiError>,
{
    if client.is_null() {
        return FfiAnvilResult::null_arg("client");
    }
    if response.is_null() {
        return FfiAnvilResult::null_arg("response");
    }
    let client = unsafe { &*client };
    let Some(core_resp) = ffi_response_to_core(unsafe { &*response }) else {
        return FfiAnvilResult::invalid_string("response body");
    };
    match parse(&client.inner, core_resp) {
        Ok(body) => FfiAnvilResult::ok_body(body),
        Err(e) => FfiAnvilResult::from_error(e),
    }
}

/// Check the reply to a transaction-build request.
///
/// On a 2xx status the result's `body` is the response text, unchanged.
/// Free the result with `anvil_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn anvil_parse_transaction(
    client: *const FfiAnvilClient,
    response: *const FfiHttpResponse,
) -> *mut FfiAnvilResult {
    catch_unwind(|| parse_with(client, response, |c, r| c.parse_build_transaction(r)))
        .unwrap_or_else(|_| FfiAnvilResult::panic("panic in anvil_parse_transaction"))
}

/// Check the reply to a submit request. On success `body` carries the
/// service's reply (with `txId`) unchanged.
#[unsafe(no_mangle)]
pub extern "C" fn anvil_parse_submit(
    client: *const FfiAnvilClient,
    response: *const FfiHttpResponse,
) -> *mut FfiAnvilResult {
    catch_unwind(|| parse_with(client, response, |c, r| c.parse_submit(r)))
        .unwrap_or_else(|_| FfiAnvilResult::panic("panic in anvil_parse_submit"))
}

/// Check the reply to a health-check request.
#[unsafe(no_mangle)]
pub extern "C" fn anvil_parse_health(
    client: *const FfiAnvilClient,
    response: *const FfiHttpResponse,
) -> *mut FfiAnvilResult {
    catch_unwind(|| parse_with(client, response, |c, r| c.parse_health(r)))
        .unwrap_or_else(|_| FfiAnvilResult::panic("panic in anvil_parse_health"))
}

// ---------------------------------------------------------------------------
// Link bring-up
// ---------------------------------------------------------------------------

/// Poll `probe` until the link is up, at most `max_attempts` times, calling
/// `delay(interval_ms)` between failed probes.
///
/// Returns `Ok`, `LinkTimeout` when the budget runs out, or `NullArg` when
/// either callback is missing. `ctx` is passed through to both callbacks.
#[unsafe(no_mangle)]
pub extern "C" fn anvil_wait_for_link(
    probe: FfiLinkProbe,
    delay: FfiDelay,
    ctx: *mut c_void,
    max_attempts: u32,
    interval_ms: u32,
) -> FfiErrorCode {
    let (Some(probe), Some(delay)) = (probe, delay) else {
        return FfiErrorCode::NullArg;
    };
    catch_unwind(|| {
        let policy = LinkPolicy {
            max_attempts,
            interval: Duration::from_millis(u64::from(interval_ms)),
        };
        let sleep = |d: Duration| delay(u32::try_from(d.as_millis()).unwrap_or(u32::MAX), ctx);
        match anvil_core::wait_for_link(&policy, || probe(ctx), sleep) {
            Ok(_) => FfiErrorCode::Ok,
            Err(e) => FfiErrorCode::from(&e),
        }
    })
    .unwrap_or(FfiErrorCode::Panic)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by any `anvil_build_*` function. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn anvil_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::free(req) });
}

/// Free a result returned by any `anvil_parse_*` function. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn anvil_free_result(result: *mut FfiAnvilResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        unsafe {
            free_c_string(result.error_message);
            free_c_string(result.body);
        }
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
