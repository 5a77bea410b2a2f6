use std::{
    fmt::Display,
    io::{self, BufRead, StdinLock, Stdout, Write},
    str::FromStr,
};

use agent_interface::Agent;
use tracing::warn;

use super::ActionFn;

/// Human-controlled agent: prompts for an action name and reads lines until a
/// legal one is entered. End of input means no action.
pub struct ManualAgent<S, A, R, W = Stdout> {
    action_fn: ActionFn<S, A>,
    input: R,
    output: W,
}

impl<S, A> ManualAgent<S, A, StdinLock<'static>, Stdout> {
    /// Agent reading stdin and prompting on stdout.
    pub fn from_stdin(action_fn: impl Fn(&S) -> Vec<A> + 'static) -> Self {
        ManualAgent::new(action_fn, io::stdin().lock(), io::stdout())
    }
}

impl<S, A, R: BufRead, W: Write> ManualAgent<S, A, R, W> {
    /// Agent reading `input` and prompting on `output`.
    pub fn new(action_fn: impl Fn(&S) -> Vec<A> + 'static, input: R, output: W) -> Self {
        ManualAgent {
            action_fn: Box::new(action_fn),
            input,
            output,
        }
    }

    /// Give the prompt writer back.
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_action(&mut self, legal: &[A]) -> io::Result<Option<A>>
    where
        A: Clone + PartialEq + Display + FromStr,
    {
        let names: Vec<String> = legal.iter().map(ToString::to_string).collect();
        loop {
            write!(self.output, "Legal actions: {}. Your move: ", names.join(", "))?;
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match line.trim().parse::<A>() {
                Ok(action) if legal.contains(&action) => return Ok(Some(action)),
                Ok(action) => writeln!(self.output, "'{action}' is not legal here")?,
                Err(_) => writeln!(self.output, "unknown action '{}'", line.trim())?,
            }
        }
    }
}

impl<S, A, R, W> Agent<S, A> for ManualAgent<S, A, R, W>
where
    A: Clone + PartialEq + Display + FromStr,
    R: BufRead,
    W: Write,
{
    fn get_action(&mut self, state: &S) -> Option<A> {
        let legal = (self.action_fn)(state);
        if legal.is_empty() {
            return None;
        }
        match self.read_action(&legal) {
            Ok(action) => action,
            Err(err) => {
                warn!("could not read the action: {err}");
                None
            }
        }
    }
}
