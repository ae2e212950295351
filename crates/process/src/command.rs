use std::fmt;

/// Ordered arguments passed to the cluster-management tool.
///
/// The argument list cannot be changed once built.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommandSpec {
    args: Vec<String>,
}

impl CommandSpec {
    /// Creates a new `CommandSpec` from the given arguments.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the arguments in order.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the first argument, which names the tool subcommand.
    #[must_use]
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CommandSpec {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args.join(" "))
    }
}
