//! HTTP GET over the GPRS bearer
//!
//! Sequences the modem's `SAPBR`/`HTTP*` commands to perform a single
//! blocking GET. Each step's reply token is checked against the required
//! literal; a present-but-wrong token aborts the sequence with a
//! [`ProtocolError`], which is caught and logged here at the boundary.
//! Cleanup (`HTTPTERM`, bearer close) is attempted regardless.

use core::fmt;

use heapless::{String, Vec};

use crate::config::{
    BEARER_OPEN_TIMEOUT_MS, HTTP_ACTION_POLLS, HTTP_ACTION_TIMEOUT_MS, HTTP_BODY_SIZE,
    HTTP_URL_SIZE,
};
use crate::modem::engine::{AtCommand, Modem};
use crate::transport::{Line, LinePort};

/// A multi-step sequence reply did not match its required token
///
/// Distinct from routine silence (which reads as absent data): the modem
/// answered, but with the wrong thing, so the sequence cannot continue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolError {
    /// Which step of the sequence failed
    pub step: &'static str,
    /// The token the modem actually returned
    pub token: Line,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: unexpected reply \"{}\"", self.step, self.token)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ProtocolError {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}: unexpected reply {}", self.step, self.token.as_str());
    }
}

/// Result of a completed HTTP GET
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code reported by `+HTTPACTION`
    pub status: u16,
    body: Vec<u8, HTTP_BODY_SIZE>,
}

impl HttpResponse {
    /// Raw response body
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.body
    }

    /// Response body as text, if it is valid UTF-8
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        core::str::from_utf8(&self.body).ok()
    }
}

impl<P: LinePort> Modem<P> {
    /// Perform one blocking HTTP GET over the GPRS bearer
    ///
    /// Best effort: any step failure is logged and yields `None`; the HTTP
    /// task and bearer context are torn down either way.
    pub fn http_get(&mut self, url: &str, apn: &str) -> Option<HttpResponse> {
        let result = self.http_get_inner(url, apn);

        // Terminate the HTTP task and close the bearer even after an
        // aborted sequence; the modem tolerates both when nothing is open.
        let _ = self.execute(&AtCommand::new("AT+HTTPTERM\n"));
        let _ = self.execute(&AtCommand::new("AT+SAPBR=0,1\n"));

        match result {
            Ok(response) => Some(response),
            Err(ref error) => {
                #[cfg(feature = "embedded")]
                defmt::warn!("http get aborted: {}", error);
                #[cfg(not(feature = "embedded"))]
                let _ = error;
                None
            }
        }
    }

    fn http_get_inner(&mut self, url: &str, apn: &str) -> Result<HttpResponse, ProtocolError> {
        let (ssl, bare_url) = if let Some(rest) = url.strip_prefix("http://") {
            (0, rest)
        } else if let Some(rest) = url.strip_prefix("https://") {
            (1, rest)
        } else {
            let mut token = Line::new();
            let _ = token.push_str(url);
            return Err(ProtocolError { step: "URL", token });
        };

        self.expect_ok("SAPBR contype", &AtCommand::new("AT+SAPBR=3,1,\"Contype\",\"GPRS\"\n"))?;
        let apn_cmd = format_http(format_args!("AT+SAPBR=3,1,\"APN\",\"{apn}\"\n"));
        self.expect_ok("SAPBR apn", &AtCommand::new(&apn_cmd))?;
        self.expect_ok(
            "SAPBR open",
            &AtCommand::new("AT+SAPBR=1,1\n").timeout_ms(BEARER_OPEN_TIMEOUT_MS),
        )?;

        self.expect_ok("HTTPINIT", &AtCommand::new("AT+HTTPINIT\n"))?;
        self.expect_ok("HTTPPARA cid", &AtCommand::new("AT+HTTPPARA=\"CID\",1\n"))?;
        let url_cmd = format_http(format_args!("AT+HTTPPARA=\"URL\",\"{bare_url}\"\n"));
        self.expect_ok("HTTPPARA url", &AtCommand::new(&url_cmd))?;
        let ssl_cmd = format_http(format_args!("AT+HTTPSSL={ssl}\n"));
        self.expect_ok("HTTPSSL", &AtCommand::new(&ssl_cmd))?;
        self.expect_ok("HTTPACTION", &AtCommand::new("AT+HTTPACTION=0\n"))?;

        let (status, nbytes) = self.await_action_result()?;

        let mut expected: String<32> = String::new();
        let _ = fmt::write(&mut expected, format_args!("+HTTPREAD: {nbytes}"));
        let read_status = self.execute(&AtCommand::new("AT+HTTPREAD\n"));
        if let Some(token) = read_status {
            if token.as_str() != expected.as_str() {
                return Err(ProtocolError {
                    step: "HTTPREAD",
                    token,
                });
            }
        }

        let mut body: Vec<u8, HTTP_BODY_SIZE> = Vec::new();
        let want = nbytes.min(HTTP_BODY_SIZE);
        let _ = body.resize(want, 0);
        let got = self.port.read_bytes(&mut body, HTTP_ACTION_TIMEOUT_MS);
        body.truncate(got);
        // The final OK sometimes rides along with the body bytes.
        if body.ends_with(b"OK\r\n") {
            body.truncate(body.len() - 4);
        }

        Ok(HttpResponse { status, body })
    }

    /// Wait for the unsolicited `+HTTPACTION: 0,<status>,<nbytes>` line
    fn await_action_result(&mut self) -> Result<(u16, usize), ProtocolError> {
        for _ in 0..HTTP_ACTION_POLLS {
            let Some(line) = self.port.read_line(HTTP_ACTION_TIMEOUT_MS) else {
                continue;
            };
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split(',');
            let _prefix = fields.next();
            let status = fields.next().and_then(|f| f.trim().parse::<u16>().ok());
            let nbytes = fields.next().and_then(|f| f.trim().parse::<usize>().ok());
            if let (Some(status), Some(nbytes)) = (status, nbytes) {
                return Ok((status, nbytes));
            }
        }
        Err(ProtocolError {
            step: "HTTPACTION result",
            token: Line::new(),
        })
    }

    /// Run one step and require a literal `OK` if the modem answers
    ///
    /// Silence passes: transient quiet is routine and non-fatal, only a
    /// present-but-wrong token aborts the sequence.
    fn expect_ok(&mut self, step: &'static str, cmd: &AtCommand<'_>) -> Result<(), ProtocolError> {
        match self.execute(cmd) {
            None => Ok(()),
            Some(token) if token.as_str() == "OK" => Ok(()),
            Some(token) => Err(ProtocolError { step, token }),
        }
    }
}

/// Format an HTTP-layer command (URLs run longer than routine commands)
fn format_http(args: fmt::Arguments<'_>) -> String<HTTP_URL_SIZE> {
    let mut buf = String::new();
    let _ = fmt::write(&mut buf, args);
    buf
}
