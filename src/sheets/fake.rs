//! In-memory stand-in for the Sheets v4 values API, served over HTTP on a
//! loopback port so the real client code path is exercised.

use crate::models::SheetRange;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tiny_http::{Header, Request, Response, Server};
use url::Url;

pub(crate) const VALID_TOKEN: &str = "valid-token";

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
    pub body: String,
}

type Grid = Vec<Vec<String>>;

#[derive(Default)]
struct FakeState {
    spreadsheets: HashMap<String, HashMap<String, Grid>>,
    created: u32,
    requests: Vec<RecordedRequest>,
    next_failure: Option<(u16, String)>,
    next_raw_reply: Option<(u16, String)>,
}

pub(crate) struct FakeSheetsService {
    server: Arc<Server>,
    state: Arc<Mutex<FakeState>>,
    thread: Option<JoinHandle<()>>,
    port: u16,
}

impl FakeSheetsService {
    pub(crate) fn start() -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let port = server.server_addr().to_ip().unwrap().port();
        let state = Arc::new(Mutex::new(FakeState::default()));

        let thread = {
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            std::thread::spawn(move || {
                for request in server.incoming_requests() {
                    handle(&state, request);
                }
            })
        };

        Self {
            server,
            state,
            thread: Some(thread),
            port,
        }
    }

    pub(crate) fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/v4/", self.port)
    }

    pub(crate) fn add_spreadsheet(&self, id: &str, sheets: &[&str]) {
        let sheets = sheets
            .iter()
            .map(|name| (name.to_string(), Grid::new()))
            .collect();
        self.state
            .lock()
            .unwrap()
            .spreadsheets
            .insert(id.to_string(), sheets);
    }

    pub(crate) fn sheet_rows(&self, id: &str, sheet: &str) -> Option<Grid> {
        self.state
            .lock()
            .unwrap()
            .spreadsheets
            .get(id)
            .and_then(|sheets| sheets.get(sheet))
            .cloned()
    }

    pub(crate) fn spreadsheet_count(&self) -> usize {
        self.state.lock().unwrap().spreadsheets.len()
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Answer the next authorized request with this status instead of handling it.
    pub(crate) fn fail_next_request(&self, status: u16, message: &str) {
        self.state.lock().unwrap().next_failure = Some((status, message.to_string()));
    }

    /// Answer the next request with this exact body, skipping auth and routing.
    pub(crate) fn reply_next_with_raw(&self, status: u16, body: &str) {
        self.state.lock().unwrap().next_raw_reply = Some((status, body.to_string()));
    }
}

impl Drop for FakeSheetsService {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn handle(state: &Mutex<FakeState>, mut request: Request) {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);

    let header = |name: &'static str| {
        request
            .headers()
            .iter()
            .find(|h| h.field.equiv(name))
            .map(|h| h.value.as_str().to_string())
    };
    let recorded = RecordedRequest {
        method: request.method().as_str().to_string(),
        url: request.url().to_string(),
        authorization: header("Authorization"),
        user_agent: header("User-Agent"),
        body,
    };

    let (status, payload) = {
        let mut state = state.lock().unwrap();
        state.requests.push(recorded.clone());
        match state.next_raw_reply.take() {
            Some(reply) => reply,
            None => {
                let (status, payload) = state.route(&recorded);
                (status, payload.to_string())
            }
        }
    };

    let content_type = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
    let response = Response::from_string(payload)
        .with_status_code(status)
        .with_header(content_type);
    let _ = request.respond(response);
}

fn error(code: u16, message: &str, status: &str) -> (u16, Value) {
    (
        code,
        json!({"error": {"code": code, "message": message, "status": status}}),
    )
}

#[derive(Deserialize)]
struct CreateBody {
    properties: CreateProperties,
}

#[derive(Deserialize)]
struct CreateProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValuesBody {
    #[serde(default)]
    values: Grid,
}

#[derive(Deserialize)]
struct BatchBody {
    data: Vec<BatchEntry>,
}

#[derive(Deserialize)]
struct BatchEntry {
    range: String,
    #[serde(default)]
    values: Grid,
}

impl FakeState {
    fn route(&mut self, request: &RecordedRequest) -> (u16, Value) {
        let expected = format!("Bearer {}", VALID_TOKEN);
        if request.authorization.as_deref() != Some(expected.as_str()) {
            return error(
                401,
                "Request had invalid authentication credentials.",
                "UNAUTHENTICATED",
            );
        }

        if let Some((status, message)) = self.next_failure.take() {
            return error(status, &message, "UNAVAILABLE");
        }

        let Ok(url) = Url::parse(&format!("http://127.0.0.1{}", request.url)) else {
            return error(400, "Invalid request URL", "INVALID_ARGUMENT");
        };
        let segments: Vec<String> = url
            .path_segments()
            .map(|segments| {
                segments
                    .map(|segment| {
                        percent_decode_str(segment)
                            .decode_utf8_lossy()
                            .into_owned()
                    })
                    .collect()
            })
            .unwrap_or_default();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        let method = request.method.as_str();
        match segments.as_slice() {
            ["v4", "spreadsheets"] if method == "POST" => self.create(&request.body),
            ["v4", "spreadsheets", id, rest @ ..] => {
                if !self.spreadsheets.contains_key(*id) {
                    return error(404, "Requested entity was not found.", "NOT_FOUND");
                }
                self.route_values(method, id, rest, &request.body)
            }
            _ => error(404, "Not found", "NOT_FOUND"),
        }
    }

    fn route_values(
        &mut self,
        method: &str,
        id: &str,
        rest: &[&str],
        body: &str,
    ) -> (u16, Value) {
        match (method, rest) {
            ("POST", ["values:batchUpdate"]) => self.batch_update(id, body),
            (method, ["values", range]) => match (method, range.strip_suffix(":append")) {
                ("POST", Some(range)) => self.append(id, range, body),
                ("GET", None) => self.read(id, range),
                _ => error(404, "Not found", "NOT_FOUND"),
            },
            _ => error(404, "Not found", "NOT_FOUND"),
        }
    }

    fn create(&mut self, body: &str) -> (u16, Value) {
        let Ok(body) = serde_json::from_str::<CreateBody>(body) else {
            return error(400, "Invalid JSON payload", "INVALID_ARGUMENT");
        };

        self.created += 1;
        let id = format!("created_{}", self.created);
        let sheets = HashMap::from([("Sheet1".to_string(), Grid::new())]);
        self.spreadsheets.insert(id.clone(), sheets);

        (
            200,
            json!({
                "spreadsheetId": id,
                "spreadsheetUrl": format!("https://docs.google.com/spreadsheets/d/{}/edit", id),
                "properties": {"title": body.properties.title},
            }),
        )
    }

    fn append(&mut self, id: &str, range: &str, body: &str) -> (u16, Value) {
        let Ok(body) = serde_json::from_str::<ValuesBody>(body) else {
            return error(400, "Invalid JSON payload", "INVALID_ARGUMENT");
        };
        let Some((sheet, row, col)) = self.locate(id, range) else {
            return unknown_range(range);
        };

        let grid = self.grid(id, &sheet);
        let last_populated = grid
            .iter()
            .rposition(|r| !r.is_empty())
            .map_or(0, |idx| idx + 1);
        let start = last_populated.max(row);
        write(grid, start, col, &body.values);

        (
            200,
            json!({
                "spreadsheetId": id,
                "tableRange": range,
                "updates": {
                    "spreadsheetId": id,
                    "updatedRange": format!("'{}'!A{}", sheet, start + 1),
                    "updatedRows": populated(&body.values),
                    "updatedCells": cells(&body.values),
                },
            }),
        )
    }

    fn batch_update(&mut self, id: &str, body: &str) -> (u16, Value) {
        let Ok(body) = serde_json::from_str::<BatchBody>(body) else {
            return error(400, "Invalid JSON payload", "INVALID_ARGUMENT");
        };

        // Resolve every range before writing anything
        let mut targets = Vec::with_capacity(body.data.len());
        for entry in &body.data {
            match self.locate(id, &entry.range) {
                Some(target) => targets.push(target),
                None => return unknown_range(&entry.range),
            }
        }

        let mut rows = 0;
        let mut total_cells = 0;
        for ((sheet, row, col), entry) in targets.into_iter().zip(&body.data) {
            write(self.grid(id, &sheet), row, col, &entry.values);
            rows += populated(&entry.values);
            total_cells += cells(&entry.values);
        }

        (
            200,
            json!({
                "spreadsheetId": id,
                "totalUpdatedRows": rows,
                "totalUpdatedCells": total_cells,
                "totalUpdatedSheets": 1,
            }),
        )
    }

    fn read(&mut self, id: &str, range: &str) -> (u16, Value) {
        let Some((sheet, row, _)) = self.locate(id, range) else {
            return unknown_range(range);
        };

        let grid = self.grid(id, &sheet);
        let mut values: Grid = grid.iter().skip(row).cloned().collect();
        while values.last().is_some_and(|r| r.is_empty()) {
            values.pop();
        }

        let mut response = json!({"range": range, "majorDimension": "ROWS"});
        if !values.is_empty() {
            response["values"] = json!(values);
        }
        (200, response)
    }

    /// Sheet name and zero-based start cell of an A1 range on an existing sheet.
    fn locate(&self, id: &str, range: &str) -> Option<(String, usize, usize)> {
        let range: SheetRange = range.parse().ok()?;
        let sheets = self.spreadsheets.get(id)?;
        if !sheets.contains_key(&range.sheet) {
            return None;
        }

        let (row, col) = match &range.cells {
            Some(cells) => start_cell(cells)?,
            None => (0, 0),
        };
        Some((range.sheet, row, col))
    }

    fn grid(&mut self, id: &str, sheet: &str) -> &mut Grid {
        self.spreadsheets
            .get_mut(id)
            .and_then(|sheets| sheets.get_mut(sheet))
            .expect("range was located")
    }
}

fn unknown_range(range: &str) -> (u16, Value) {
    error(
        400,
        &format!("Unable to parse range: {}", range),
        "INVALID_ARGUMENT",
    )
}

fn write(grid: &mut Grid, start_row: usize, start_col: usize, values: &Grid) {
    for (offset, values) in values.iter().enumerate() {
        let idx = start_row + offset;
        if grid.len() <= idx {
            grid.resize(idx + 1, Vec::new());
        }
        if values.is_empty() {
            continue;
        }

        let row = &mut grid[idx];
        if row.len() < start_col + values.len() {
            row.resize(start_col + values.len(), String::new());
        }
        row[start_col..start_col + values.len()].clone_from_slice(values);
    }
}

fn populated(values: &Grid) -> usize {
    values.iter().filter(|row| !row.is_empty()).count()
}

fn cells(values: &Grid) -> usize {
    values.iter().map(Vec::len).sum()
}

/// Zero-based (row, column) of the first cell in `A1` or `B2:C3`.
fn start_cell(cells: &str) -> Option<(usize, usize)> {
    let first = cells.split(':').next()?;
    let letters: String = first.chars().take_while(char::is_ascii_alphabetic).collect();
    let digits = &first[letters.len()..];

    let col = letters
        .chars()
        .map(|c| c.to_ascii_uppercase() as usize - 'A' as usize + 1)
        .fold(0, |acc, n| acc * 26 + n);
    let row: usize = match digits {
        "" => 1,
        digits => digits.parse().ok()?,
    };

    Some((row.checked_sub(1)?, col.max(1) - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_cell() {
        assert_eq!(start_cell("A1"), Some((0, 0)));
        assert_eq!(start_cell("D5"), Some((4, 3)));
        assert_eq!(start_cell("AA10:AB12"), Some((9, 26)));
        assert_eq!(start_cell("B"), Some((0, 1)));
        assert_eq!(start_cell("A0"), None);
    }
}
