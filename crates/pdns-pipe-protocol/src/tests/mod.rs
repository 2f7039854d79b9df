//! Crate-level integration and BDD tests.

use std::io::Cursor;

use crate::backend::{Backend, HookResult};
use crate::output::Responder;
use crate::records::{Answer, AxfrRequest, Query};
use crate::session::{Session, SessionOptions};


/// Backend that records every request and answers queries with one record.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub(crate) queries: Vec<Query>,
    pub(crate) zones: Vec<String>,
    pub(crate) pings: usize,
}

impl Backend for RecordingBackend {
    fn query(&mut self, query: &Query, out: &mut dyn Responder) -> HookResult {
        self.queries.push(query.clone());
        out.answer(&Answer::for_query(query, "A", "192.0.2.10").with_ttl(60))?;
        out.done(None)?;
        Ok(())
    }

    fn axfr(&mut self, request: &AxfrRequest, out: &mut dyn Responder) -> HookResult {
        self.zones.push(request.soa_resource().to_owned());
        out.done(None)?;
        Ok(())
    }

    fn ping(&mut self, out: &mut dyn Responder) -> HookResult {
        self.pings += 1;
        out.done(None)?;
        Ok(())
    }
}

#[test]
fn end_to_end_session_with_recording_backend() {
    let input = "HELO\t2\n\
                 Q\texample.org\tIN\tANY\t-1\t192.0.2.1\t198.51.100.7\n\
                 AXFR\texample.org\n\
                 PING\n";
    let mut output = Vec::new();
    let mut session = Session::new(RecordingBackend::default(), SessionOptions::default());
    let summary = session
        .serve(Cursor::new(input.as_bytes().to_vec()), &mut output)
        .expect("session ends cleanly");

    assert_eq!(summary.turns, 4);
    assert_eq!(
        String::from_utf8(output).expect("utf8 output"),
        "OK\tBackend starting version 2.\n\
         DATA\texample.org\tIN\tA\t60\t-1\t192.0.2.10\nEND\n\
         END\n\
         END\n"
    );

    let backend = session.into_backend();
    assert_eq!(backend.queries.len(), 1);
    assert_eq!(backend.zones, ["example.org"]);
    assert_eq!(backend.pings, 1);
}
