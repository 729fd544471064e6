use std::future::Future;

pub const CONFIRM_LABEL: &str = "Kyllä";
pub const CANCEL_LABEL: &str = "Peruuta";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub title: &'static str,
    pub message: &'static str,
}

impl Prompt {
    pub const DELETE_CUSTOMER: Prompt = Prompt {
        title: "Vahvista poisto",
        message: "Haluatko varmasti poistaa asiakkaan?",
    };

    pub const DELETE_TRAINING: Prompt = Prompt {
        title: "Vahvista poisto",
        message: "Poistetaanko harjoitus?",
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Confirm,
    Cancel,
    Dismiss,
}

impl Choice {
    pub fn from_form(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("confirm") => Self::Confirm,
            Some("cancel") => Self::Cancel,
            _ => Self::Dismiss,
        }
    }
}

/// Runs its action only on [`Choice::Confirm`]; dropping it runs nothing.
#[must_use = "a confirmation does nothing until it is resolved"]
pub struct Confirmation<A> {
    prompt: Prompt,
    action: A,
}

impl<A> Confirmation<A> {
    pub fn new(prompt: Prompt, action: A) -> Self {
        Self { prompt, action }
    }

    pub fn prompt(&self) -> Prompt {
        self.prompt
    }

    pub fn resolve<R>(self, choice: Choice) -> Option<R>
    where
        A: FnOnce() -> R,
    {
        match choice {
            Choice::Confirm => Some((self.action)()),
            Choice::Cancel | Choice::Dismiss => None,
        }
    }

    pub async fn resolve_async<F>(self, choice: Choice) -> Option<F::Output>
    where
        A: FnOnce() -> F,
        F: Future,
    {
        match choice {
            Choice::Confirm => Some((self.action)().await),
            Choice::Cancel | Choice::Dismiss => None,
        }
    }
}
