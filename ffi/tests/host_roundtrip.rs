//! Play the firmware host: take a request from the C ABI, execute it with
//! ureq against the mock server, and hand the reply back for checking.

use std::ffi::{CStr, CString};
use std::net::SocketAddr;
use std::os::raw::c_char;

use anvil_ffi::types::{FfiErrorCode, FfiHttpMethod, FfiHttpRequest, FfiHttpResponse};
use anvil_ffi::*;
use mock_server::{MockState, RECORDED_RESPONSE, SUBMIT_PATH, SUBMIT_RESPONSE};

const KEY: &str = "testnet_key";
const CHANGE: &str = "addr_test1qrydyk6uw6cehk5u3zspyz3dhnwzmhfls2fp42vv5dv9g2z3885pg4kpkn30ptezc855lu3w5ey93zcr5lrezjmwkftqg8xvge";
const RECEIVER: &str = "addr_test1qr0tkwvlln0v5fljdxceudmlpt5y6szc84vpj4skm836tgn4hsqaesgg97l8ppy5rsn0alj8pth6lqe20fdyydsdgw6sr74cyt";

fn spawn_mock(state: MockState) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, state).await
        })
        .unwrap();
    });

    addr
}

fn c_str<'a>(ptr: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
}

/// Execute an `FfiHttpRequest` the way a host HTTP stack would, returning
/// the status and the body as a C string.
fn execute(req: &FfiHttpRequest) -> (u16, CString) {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let headers = unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) };
    let url = c_str(req.url);

    let mut response = match req.method {
        FfiHttpMethod::Get => {
            let mut builder = agent.get(url);
            for h in headers {
                builder = builder.header(c_str(h.key), c_str(h.value));
            }
            builder.call()
        }
        FfiHttpMethod::Post => {
            let mut builder = agent.post(url);
            for h in headers {
                builder = builder.header(c_str(h.key), c_str(h.value));
            }
            builder.send(c_str(req.body).as_bytes())
        }
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    (status, CString::new(body).unwrap())
}

#[test]
fn payment_round_trip_returns_recorded_response() {
    let addr = spawn_mock(MockState::new(KEY));
    let url = CString::new(format!("http://{addr}")).unwrap();
    let key = CString::new(KEY).unwrap();
    let client = anvil_client_new(url.as_ptr(), key.as_ptr());

    let change = CString::new(CHANGE).unwrap();
    let to = CString::new(RECEIVER).unwrap();
    let req = anvil_build_payment(client, change.as_ptr(), to.as_ptr(), 10_000_000);
    assert!(!req.is_null());

    let (status, body) = execute(unsafe { &*req });
    anvil_free_request(req);

    let resp = FfiHttpResponse {
        status,
        body: body.as_ptr(),
    };
    let result = anvil_parse_transaction(client, &resp);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    assert_eq!(c_str(r.body), RECORDED_RESPONSE);

    anvil_free_result(result);
    anvil_client_free(client);
}

#[test]
fn wrong_key_round_trip_reports_http_error() {
    let addr = spawn_mock(MockState::new(KEY));
    let url = CString::new(format!("http://{addr}")).unwrap();
    let key = CString::new("not_the_key").unwrap();
    let client = anvil_client_new(url.as_ptr(), key.as_ptr());

    let body = CString::new(r#"{"changeAddress":"a","outputs":[]}"#).unwrap();
    let req = anvil_build_transaction(client, body.as_ptr());
    let (status, reply) = execute(unsafe { &*req });
    anvil_free_request(req);

    let resp = FfiHttpResponse {
        status,
        body: reply.as_ptr(),
    };
    let result = anvil_parse_transaction(client, &resp);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Http);
    assert_eq!(r.http_status, 401);

    anvil_free_result(result);
    anvil_client_free(client);
}

#[test]
fn health_round_trip() {
    let addr = spawn_mock(MockState::new(KEY));
    let url = CString::new(format!("http://{addr}")).unwrap();
    let key = CString::new(KEY).unwrap();
    let client = anvil_client_new(url.as_ptr(), key.as_ptr());

    let req = anvil_build_health(client);
    let (status, reply) = execute(unsafe { &*req });
    anvil_free_request(req);

    let resp = FfiHttpResponse {
        status,
        body: reply.as_ptr(),
    };
    let result = anvil_parse_health(client, &resp);
    assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Ok);

    anvil_free_result(result);
    anvil_client_free(client);
}

#[test]
fn submit_round_trip_returns_tx_id() {
    let state = MockState::new(KEY);
    let addr = spawn_mock(state.clone());
    let url = CString::new(format!("http://{addr}")).unwrap();
    let key = CString::new(KEY).unwrap();
    let client = anvil_client_new(url.as_ptr(), key.as_ptr());

    let tx = CString::new("84a600d9").unwrap();
    let sig = CString::new("a100d90102").unwrap();
    let sigs = [sig.as_ptr()];
    let req = anvil_build_submit(client, tx.as_ptr(), sigs.as_ptr(), 1);
    assert!(!req.is_null());
    let (status, reply) = execute(unsafe { &*req });
    anvil_free_request(req);

    let resp = FfiHttpResponse {
        status,
        body: reply.as_ptr(),
    };
    let result = anvil_parse_submit(client, &resp);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    assert_eq!(c_str(r.body), SUBMIT_RESPONSE);

    let received = state.received.blocking_read();
    assert_eq!(received[0].path, SUBMIT_PATH);
    assert_eq!(
        received[0].body,
        r#"{"transaction":"84a600d9","signatures":["a100d90102"]}"#
    );
    drop(received);

    anvil_free_result(result);
    anvil_client_free(client);
}
