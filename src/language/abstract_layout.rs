//! Selector chains over layout templates

use std::fmt;

use serde::{Deserialize, Serialize};

use super::concrete::BoundLayout;
use crate::parser::lexer::Name;

/// Binds one variable to every atom of a signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SigSelector {
    pub varname: String,
    pub sig: String,
}

/// Binds a tuple of variables to every ground tuple of a predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredSelector {
    pub pred: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "tag")]
pub enum Selector {
    SigSelector(SigSelector),
    PredSelector(PredSelector),
}

impl Selector {
    pub fn sig(varname: impl Into<String>, sig: impl Into<String>) -> Self {
        Selector::SigSelector(SigSelector {
            varname: varname.into(),
            sig: sig.into(),
        })
    }

    pub fn pred(pred: impl Into<String>, args: &[&str]) -> Self {
        Selector::PredSelector(PredSelector {
            pred: pred.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        })
    }

    /// Variables this selector introduces, in positional order
    pub fn variables(&self) -> Vec<&str> {
        match self {
            Selector::SigSelector(s) => vec![s.varname.as_str()],
            Selector::PredSelector(p) => p.args.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::SigSelector(s) => write!(f, "{} : {}", Name(&s.varname), Name(&s.sig)),
            Selector::PredSelector(p) => {
                write!(f, "{}(", Name(&p.pred))?;
                for (i, arg) in p.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", Name(arg))?;
                }
                f.write_str(")")
            }
        }
    }
}

/// What follows a selector: another selector or the terminal template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutBody {
    Nested(Box<AbstractLayout>),
    Terminal(BoundLayout),
}

/// `IF selector THEN body`, nested to the right
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename = "AbstractLayout")]
pub struct AbstractLayout {
    pub selector: Selector,
    pub layout: LayoutBody,
}

impl AbstractLayout {
    pub fn new(selector: Selector, terminal: BoundLayout) -> Self {
        Self {
            selector,
            layout: LayoutBody::Terminal(terminal),
        }
    }

    pub fn nest(selector: Selector, inner: AbstractLayout) -> Self {
        Self {
            selector,
            layout: LayoutBody::Nested(Box::new(inner)),
        }
    }

    /// Build the right-nested chain `IF s0 THEN IF s1 THEN ... terminal`.
    ///
    /// Returns `None` for an empty selector list.
    pub fn compose(selectors: Vec<Selector>, terminal: BoundLayout) -> Option<Self> {
        let mut rev = selectors.into_iter().rev();
        let mut layout = AbstractLayout::new(rev.next()?, terminal);
        for selector in rev {
            layout = AbstractLayout::nest(selector, layout);
        }
        Some(layout)
    }

    /// Selectors from the outermost inwards
    pub fn selectors(&self) -> Vec<&Selector> {
        let mut out = vec![&self.selector];
        let mut body = &self.layout;
        while let LayoutBody::Nested(inner) = body {
            out.push(&inner.selector);
            body = &inner.layout;
        }
        out
    }

    pub fn terminal(&self) -> &BoundLayout {
        let mut body = &self.layout;
        loop {
            match body {
                LayoutBody::Nested(inner) => body = &inner.layout,
                LayoutBody::Terminal(t) => return t,
            }
        }
    }

    /// Number of nested selectors below the outermost one
    pub fn depth(&self) -> usize {
        self.selectors().len() - 1
    }

    /// Ranking cost used by inference; lower is simpler
    pub fn complexity(&self) -> usize {
        self.depth() + 1
    }
}

impl fmt::Display for AbstractLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF {} THEN ", self.selector)?;
        match &self.layout {
            LayoutBody::Nested(inner) => write!(f, "{}", inner),
            LayoutBody::Terminal(t) => write!(f, "{}", t),
        }
    }
}
