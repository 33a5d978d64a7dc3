//! Scripted toolkit double for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::error::{Result, ToolkitError};
use crate::toolkit::{Invocation, Toolkit};

enum Reply {
    Output(String),
    Fail(String),
}

/// Records every invocation and replays queued replies per module.
///
/// Modules without a queued reply succeed with empty output.
#[derive(Default)]
pub struct ScriptedToolkit {
    replies: RefCell<HashMap<String, VecDeque<Reply>>>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, module: &str, output: &str) -> Self {
        self.push(module, Reply::Output(output.to_string()));
        self
    }

    pub fn fail(self, module: &str, stderr: &str) -> Self {
        self.push(module, Reply::Fail(stderr.to_string()));
        self
    }

    fn push(&self, module: &str, reply: Reply) {
        self.replies
            .borrow_mut()
            .entry(module.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn modules(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| c.module().to_string())
            .collect()
    }
}

impl Toolkit for ScriptedToolkit {
    fn run(&self, invocation: &Invocation) -> Result<String> {
        self.calls.borrow_mut().push(invocation.clone());
        let reply = self
            .replies
            .borrow_mut()
            .get_mut(invocation.module())
            .and_then(VecDeque::pop_front);
        match reply {
            Some(Reply::Output(out)) => Ok(out),
            Some(Reply::Fail(stderr)) => Err(ToolkitError::Failed {
                module: invocation.module().to_string(),
                status: Some(1),
                stderr,
            }
            .into()),
            None => Ok(String::new()),
        }
    }
}
