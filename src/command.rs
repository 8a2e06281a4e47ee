// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Construction of external command lines.

use std::fmt;

/// One external process invocation. Arguments are passed verbatim, so file
/// paths and filter graphs need no shell quoting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '\'') {
                write!(f, " '{}'", arg.replace('\'', r"'\''"))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Linearly maps `value` from `src` onto `dst`.
pub fn map_range(value: f64, src: (f64, f64), dst: (f64, f64)) -> f64 {
    let (smin, smax) = src;
    let (dmin, dmax) = dst;
    dmin + (value - smin) * (dmax - dmin) / (smax - smin)
}

/// Formats a filter parameter, always keeping at least one decimal place.
pub fn format_fraction(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// A GStreamer pipeline description made of elements linked with `!`.
///
/// Each element is kept as separate tokens so that a property value holding
/// spaces stays a single argument of `gst-launch-1.0`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pipeline {
    elements: Vec<Vec<String>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element (or caps) followed by its properties.
    pub fn element<I, S>(mut self, name: &str, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = vec![name.to_string()];
        tokens.extend(props.into_iter().map(Into::into));
        self.elements.push(tokens);
        self
    }

    /// Appends a chain written in gst-launch syntax, e.g.
    /// `h264parse ! vaapih264dec`.
    pub fn chain(mut self, description: &str) -> Self {
        for element in description.split('!') {
            let tokens: Vec<String> = element.split_whitespace().map(str::to_string).collect();
            if !tokens.is_empty() {
                self.elements.push(tokens);
            }
        }
        self
    }

    pub fn into_args(self) -> Vec<String> {
        let mut args = Vec::new();
        for (i, element) in self.elements.into_iter().enumerate() {
            if i > 0 {
                args.push("!".to_string());
            }
            args.extend(element);
        }
        args
    }
}
