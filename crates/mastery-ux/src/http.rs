use crate::{UxCommand, UxError, UxQuery, UxService};
use mastery_session::SessionError;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub bind: SocketAddr,
}

#[derive(Debug, Error)]
pub enum HttpServeError {
    #[error("bind failed: {0}")]
    Bind(std::io::Error),
    #[error("accept failed: {0}")]
    Accept(std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HttpResponse {
    status: u16,
    body: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Healthz,
    Index,
    Query(UxQuery),
    Command(UxCommand),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
enum RouteError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),
}

/// Serve one session until the process is stopped.
///
/// Connections are handled one at a time, so requests against the session
/// are strictly sequential.
pub fn serve_session(config: HttpServerConfig, service: UxService) -> Result<(), HttpServeError> {
    let listener = TcpListener::bind(config.bind).map_err(HttpServeError::Bind)?;
    tracing::info!(bind = %config.bind, "serving session");
    serve_with_limit(listener, service, None).map(|_| ())
}

fn serve_with_limit(
    listener: TcpListener,
    mut service: UxService,
    max_requests: Option<usize>,
) -> Result<UxService, HttpServeError> {
    let mut served = 0usize;

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, &mut service) {
                    let _ = write_json_response(
                        &mut stream,
                        HttpResponse {
                            status: 500,
                            body: json!({ "error": format!("internal server error: {err}") }),
                        },
                    );
                }
                served += 1;
            }
            Err(err) => return Err(HttpServeError::Accept(err)),
        }

        if let Some(limit) = max_requests
            && served >= limit
        {
            break;
        }
    }

    Ok(service)
}

fn handle_connection(stream: &mut TcpStream, service: &mut UxService) -> Result<(), String> {
    let response = match read_request_line(stream)
        .and_then(|(method, target)| parse_route(&method, &target))
    {
        Ok(route) => execute_route(service, route),
        Err(err) => route_error_response(err),
    };
    write_json_response(stream, response).map_err(|e| e.to_string())
}

fn read_request_line(stream: &mut TcpStream) -> Result<(String, String), RouteError> {
    let mut buf = [0u8; 8192];
    let n = stream
        .read(&mut buf)
        .map_err(|e| RouteError::BadRequest(format!("failed to read request: {e}")))?;
    if n == 0 {
        return Err(RouteError::BadRequest("empty request".to_string()));
    }
    let req = String::from_utf8_lossy(&buf[..n]);
    let line = req
        .lines()
        .next()
        .ok_or_else(|| RouteError::BadRequest("missing request line".to_string()))?;
    parse_request_line(line)
}

fn parse_request_line(line: &str) -> Result<(String, String), RouteError> {
    let mut parts = line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| RouteError::BadRequest("missing method".to_string()))?;
    let target = parts
        .next()
        .ok_or_else(|| RouteError::BadRequest("missing target".to_string()))?;
    Ok((method.to_string(), target.to_string()))
}

fn parse_route(method: &str, target: &str) -> Result<Route, RouteError> {
    let route = parse_route_target(target)?;
    let expected = match route {
        Route::Command(_) => "POST",
        _ => "GET",
    };
    if method != expected {
        return Err(RouteError::MethodNotAllowed(format!(
            "use {expected} for {}",
            split_target(target).0
        )));
    }
    Ok(route)
}

fn parse_route_target(target: &str) -> Result<Route, RouteError> {
    let (path, query) = split_target(target);
    let params = parse_query_params(query);

    match path {
        "/" => Ok(Route::Index),
        "/healthz" => Ok(Route::Healthz),
        "/state" => Ok(Route::Query(UxQuery::State)),
        "/catalogue" => Ok(Route::Query(UxQuery::Catalogue)),
        "/advisory" => Ok(Route::Query(UxQuery::Advisory)),
        "/completion" => Ok(Route::Query(UxQuery::Completion)),
        "/activity" => Ok(Route::Query(UxQuery::Activity)),
        "/profile" => Ok(Route::Query(UxQuery::Profile)),
        "/assessment/start" => Ok(Route::Command(UxCommand::StartAssessment {
            material_id: required(&params, "material")?,
            slot: required_number(&params, "slot")?,
        })),
        "/assessment/abandon" => Ok(Route::Command(UxCommand::AbandonAssessment)),
        "/material/open" => Ok(Route::Command(UxCommand::OpenMaterial {
            material_id: required(&params, "material")?,
        })),
        "/assessment/answer" => {
            let raw = required(&params, "answers")?;
            let answers = raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    s.trim().parse::<usize>().map_err(|_| {
                        RouteError::BadRequest(format!("answers: not an option index: {s}"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Route::Command(UxCommand::Answer { answers }))
        }
        "/submit" => Ok(Route::Command(UxCommand::Submit {
            material_id: required(&params, "material")?,
            slot: required_number(&params, "slot")?,
            correct: required_number(&params, "correct")?,
            total: required_number(&params, "total")?,
        })),
        "/advisory/dismiss" => Ok(Route::Command(UxCommand::DismissAdvisory)),
        "/evaluate" => Ok(Route::Command(UxCommand::Evaluate)),
        "/reset" => Ok(Route::Command(UxCommand::Reset)),
        _ => Err(RouteError::NotFound(format!("unknown route: {path}"))),
    }
}

fn required(params: &BTreeMap<String, String>, key: &str) -> Result<String, RouteError> {
    params
        .get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| RouteError::BadRequest(format!("missing query parameter: {key}")))
}

fn required_number<T: std::str::FromStr>(
    params: &BTreeMap<String, String>,
    key: &str,
) -> Result<T, RouteError> {
    let raw = required(params, key)?;
    raw.parse()
        .map_err(|_| RouteError::BadRequest(format!("{key}: not a number: {raw}")))
}

fn split_target(target: &str) -> (&str, &str) {
    match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    }
}

fn parse_query_params(query: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        let key = percent_decode(k);
        if key.is_empty() {
            continue;
        }
        out.insert(key, percent_decode(v));
    }
    out
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(h), Some(l)) => {
                        out.push(h * 16 + l);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

fn execute_route(service: &mut UxService, route: Route) -> HttpResponse {
    let result = match route {
        Route::Healthz => Ok(json!({ "ok": true })),
        Route::Index => Ok(json!({
            "service": "mastery.session.v1",
            "routes": [
                "GET /healthz",
                "GET /state",
                "GET /catalogue",
                "GET /advisory",
                "GET /completion",
                "GET /activity",
                "GET /profile",
                "POST /material/open?material=<id>",
                "POST /assessment/start?material=<id>&slot=<0|1>",
                "POST /assessment/answer?answers=<i,j,...>",
                "POST /assessment/abandon",
                "POST /submit?material=<id>&slot=<0|1>&correct=<n>&total=<n>",
                "POST /advisory/dismiss",
                "POST /evaluate",
                "POST /reset"
            ]
        })),
        Route::Query(query) => service.query_json(query),
        Route::Command(command) => service.execute(command),
    };
    match result {
        Ok(body) => HttpResponse { status: 200, body },
        Err(err) => ux_error_response(err),
    }
}

fn ux_error_response(err: UxError) -> HttpResponse {
    let status = match &err {
        UxError::Session(e) if e.is_unknown_material() => 404,
        UxError::Session(e) if e.is_conflict() => 409,
        UxError::Session(SessionError::Curriculum(_)) | UxError::Serialization(_) => 500,
        UxError::Session(_) => 400,
    };
    HttpResponse {
        status,
        body: json!({ "error": err.to_string() }),
    }
}

fn route_error_response(err: RouteError) -> HttpResponse {
    let status = match err {
        RouteError::BadRequest(_) => 400,
        RouteError::NotFound(_) => 404,
        RouteError::MethodNotAllowed(_) => 405,
    };
    HttpResponse {
        status,
        body: json!({ "error": err.to_string() }),
    }
}

fn write_json_response(stream: &mut TcpStream, response: HttpResponse) -> std::io::Result<()> {
    let body = serde_json::to_vec_pretty(&response.body)?;
    let status_text = reason_phrase(response.status);
    let header = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nAccess-Control-Allow-Origin: *\r\nAccess-Control-Allow-Methods: GET, POST\r\nConnection: close\r\n\r\n",
        response.status,
        status_text,
        body.len()
    );
    stream.write_all(header.as_bytes())?;
    stream.write_all(&body)?;
    stream.flush()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastery_session::Session;
    use std::thread;

    fn service() -> UxService {
        UxService::new(Session::builtin().expect("builtin curriculum"))
    }

    #[test]
    fn route_parsing_handles_query_params() {
        let route = parse_route("POST", "/submit?material=t4-1&slot=1&correct=3&total=4")
            .expect("route should parse");
        assert_eq!(
            route,
            Route::Command(UxCommand::Submit {
                material_id: "t4-1".to_string(),
                slot: 1,
                correct: 3,
                total: 4,
            })
        );

        let route = parse_route("POST", "/assessment/answer?answers=0,2,%201,3")
            .expect("route should parse");
        assert_eq!(
            route,
            Route::Command(UxCommand::Answer {
                answers: vec![0, 2, 1, 3]
            })
        );
    }

    #[test]
    fn route_parsing_reports_missing_and_malformed_params() {
        let err = parse_route("POST", "/assessment/start?slot=0").expect_err("route should fail");
        assert!(matches!(err, RouteError::BadRequest(_)));

        let err = parse_route("POST", "/submit?material=t4-1&slot=x&correct=1&total=2")
            .expect_err("route should fail");
        assert!(matches!(err, RouteError::BadRequest(msg) if msg.contains("slot")));
    }

    #[test]
    fn methods_are_checked_per_route() {
        assert!(matches!(
            parse_route("POST", "/state"),
            Err(RouteError::MethodNotAllowed(_))
        ));
        assert!(matches!(
            parse_route("GET", "/reset"),
            Err(RouteError::MethodNotAllowed(_))
        ));
        assert!(matches!(
            parse_route("GET", "/nowhere"),
            Err(RouteError::NotFound(_))
        ));
    }

    #[test]
    fn execute_route_maps_session_errors_to_status() {
        let mut service = service();
        let unknown = execute_route(
            &mut service,
            Route::Command(UxCommand::StartAssessment {
                material_id: "missing".to_string(),
                slot: 0,
            }),
        );
        assert_eq!(unknown.status, 404);

        let locked = execute_route(
            &mut service,
            Route::Command(UxCommand::StartAssessment {
                material_id: "t5-1".to_string(),
                slot: 0,
            }),
        );
        assert_eq!(locked.status, 409);

        let bad = execute_route(
            &mut service,
            Route::Command(UxCommand::Submit {
                material_id: "t4-1".to_string(),
                slot: 0,
                correct: 0,
                total: 0,
            }),
        );
        assert_eq!(bad.status, 400);
    }

    #[test]
    fn percent_decode_works_for_common_forms() {
        assert_eq!(percent_decode("t4%2D1"), "t4-1");
        assert_eq!(percent_decode("basic+1"), "basic 1");
        assert_eq!(percent_decode("100%"), "100%");
    }

    #[test]
    fn server_handles_requests_sequentially() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let server = thread::spawn(move || serve_with_limit(listener, service(), Some(2)));

        let send = |request: &str| {
            let mut stream = TcpStream::connect(addr).expect("connect");
            stream.write_all(request.as_bytes()).expect("write");
            let mut response = String::new();
            stream.read_to_string(&mut response).expect("read");
            response
        };

        let first = send("POST /submit?material=t4-1&slot=0&correct=2&total=5 HTTP/1.1\r\n\r\n");
        assert!(first.starts_with("HTTP/1.1 200 OK"));
        assert!(first.contains("\"percentage\": 40"));

        let second = send("GET /advisory HTTP/1.1\r\n\r\n");
        assert!(second.starts_with("HTTP/1.1 200 OK"));
        assert!(second.contains("Foundational challenges detected."));

        let service = server
            .join()
            .expect("server thread")
            .expect("server result");
        assert!(service.session().catalogue().has_remedial());
    }
}
