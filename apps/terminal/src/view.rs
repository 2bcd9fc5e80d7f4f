//! Terminal projection of a chat session.

use std::{
    io::{self, Write},
    time::Duration,
};

use client_core::SessionSnapshot;
use rand::Rng;
use shared::domain::{Sender, Turn, TurnKind};

const TIP_AFTER_REPLIES: usize = 3;

pub const HELP_TEXT: &str = "\
How to use Jokester Bot:
- Ask me anything: math, facts, advice, or just for a joke!
- I'll always answer, but expect a little humor along the way.
- Type 'fact' to hear a silly fun fact!
- Type 'help' to see this message again.
- Type 'exit' or 'quit' to leave.";

pub const FUN_FACTS: &[&str] = &[
    "Did you know? If you tickle a group of mathematicians, they might start giggling in sines!",
    "Why did the computer go to the doctor? Because it had a byte!",
    "Why don't skeletons fight each other? They don't have the guts!",
    "Parallel lines have so much in common. It's a shame they'll never meet.",
    "Why did the scarecrow win an award? Because he was outstanding in his field!",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Fact,
    Quit,
    Message,
}

/// Words handled locally instead of being sent to the backend.
pub fn parse_command(line: &str) -> Command {
    match line.trim().to_ascii_lowercase().as_str() {
        "help" => Command::Help,
        "fact" => Command::Fact,
        "exit" | "quit" => Command::Quit,
        _ => Command::Message,
    }
}

#[derive(Debug, Clone)]
pub struct Labels {
    pub user: String,
    pub bot: String,
}

impl Labels {
    fn for_sender(&self, sender: Sender) -> &str {
        match sender {
            Sender::User => &self.user,
            Sender::Bot => &self.bot,
        }
    }
}

/// Label on the first line, continuation lines aligned under the text.
pub fn format_turn(turn: &Turn, labels: &Labels) -> String {
    let label = labels.for_sender(turn.sender);
    let indent = " ".repeat(label.chars().count() + 2);
    let mut out = String::new();
    for (idx, line) in turn.text.split('\n').enumerate() {
        if idx == 0 {
            out.push_str(label);
            out.push_str(": ");
        } else {
            out.push('\n');
            out.push_str(&indent);
        }
        out.push_str(line);
    }
    out
}

pub struct TerminalView {
    labels: Labels,
    typing_delay: Duration,
    rendered: usize,
    typing_shown: bool,
    replies_seen: usize,
}

impl TerminalView {
    pub fn new(labels: Labels, typing_delay: Duration) -> Self {
        Self {
            labels,
            typing_delay,
            rendered: 0,
            typing_shown: false,
            replies_seen: 0,
        }
    }

    /// Prints whatever the snapshot holds that has not been printed yet.
    pub async fn render<W: Write>(
        &mut self,
        snapshot: &SessionSnapshot,
        out: &mut W,
    ) -> io::Result<()> {
        for turn in snapshot.transcript.iter().skip(self.rendered) {
            self.rendered += 1;
            // The terminal already echoed what the user typed after the prompt.
            if turn.sender == Sender::User {
                continue;
            }

            let text = format_turn(turn, &self.labels);
            self.type_out(&text, out).await?;
            if turn.kind != TurnKind::Normal {
                continue;
            }

            self.replies_seen += 1;
            if self.replies_seen == TIP_AFTER_REPLIES {
                writeln!(out, "(Tip: You can ask for a fun fact by typing 'fact'!)")?;
            }
        }

        if snapshot.show_typing_indicator() && !self.typing_shown {
            writeln!(out, "{} is typing...", self.labels.bot)?;
        }
        self.typing_shown = snapshot.show_typing_indicator();
        out.flush()
    }

    pub fn prompt<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}: ", self.labels.user)?;
        out.flush()
    }

    pub fn print_intro<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "(Type 'help' for options and 'fact' for a surprise!)")?;
        writeln!(out)
    }

    pub fn print_help<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{HELP_TEXT}")?;
        writeln!(out)
    }

    pub fn print_fact<W: Write, R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        out: &mut W,
    ) -> io::Result<()> {
        let fact = FUN_FACTS[rng.random_range(0..FUN_FACTS.len())];
        writeln!(out, "{fact}")
    }

    pub fn print_blank_hint<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Please enter a message or type 'help'.")
    }

    pub fn say_goodbye<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "👋 Goodbye! Keep smiling and stay curious!")
    }

    async fn type_out<W: Write>(&self, text: &str, out: &mut W) -> io::Result<()> {
        if self.typing_delay.is_zero() {
            return writeln!(out, "{text}");
        }
        for ch in text.chars() {
            write!(out, "{ch}")?;
            out.flush()?;
            tokio::time::sleep(self.typing_delay).await;
        }
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn labels() -> Labels {
        Labels {
            user: "You".to_string(),
            bot: "Bot".to_string(),
        }
    }

    fn snapshot(turns: Vec<Turn>, in_flight: bool) -> SessionSnapshot {
        SessionSnapshot {
            transcript: Arc::new(turns),
            draft: String::new(),
            in_flight,
        }
    }

    #[test]
    fn recognizes_local_commands() {
        assert_eq!(parse_command(" HELP "), Command::Help);
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("Exit"), Command::Quit);
        assert_eq!(parse_command("Fact "), Command::Fact);
        assert_eq!(parse_command("tell me a fact"), Command::Message);
        assert_eq!(parse_command("help me"), Command::Message);
    }

    #[test]
    fn multi_line_text_is_indented_under_the_label() {
        let turn = Turn::bot("first\nsecond");
        assert_eq!(format_turn(&turn, &labels()), "Bot: first\n     second");
    }

    #[tokio::test]
    async fn renders_only_new_bot_turns_and_typing_indicator() {
        let mut view = TerminalView::new(labels(), Duration::ZERO);
        let mut out = Vec::new();

        view.render(&snapshot(vec![Turn::greeting("hi")], false), &mut out)
            .await
            .expect("render");
        view.render(
            &snapshot(vec![Turn::greeting("hi"), Turn::user("2+2")], true),
            &mut out,
        )
        .await
        .expect("render");
        view.render(
            &snapshot(
                vec![Turn::greeting("hi"), Turn::user("2+2"), Turn::bot("4")],
                false,
            ),
            &mut out,
        )
        .await
        .expect("render");

        let printed = String::from_utf8(out).expect("utf8");
        assert_eq!(printed, "Bot: hi\nBot is typing...\nBot: 4\n");
    }

    #[tokio::test]
    async fn typing_indicator_is_printed_once_per_request() {
        let mut view = TerminalView::new(labels(), Duration::ZERO);
        let mut out = Vec::new();
        let pending = snapshot(vec![Turn::greeting("hi"), Turn::user("a")], true);

        view.render(&pending, &mut out).await.expect("render");
        view.render(&pending, &mut out).await.expect("render");

        let printed = String::from_utf8(out).expect("utf8");
        assert_eq!(printed.matches("is typing...").count(), 1);
    }

    #[test]
    fn fact_is_answered_from_the_local_table() {
        let view = TerminalView::new(labels(), Duration::ZERO);
        let mut rng = StdRng::seed_from_u64(7);
        let mut out = Vec::new();

        view.print_fact(&mut rng, &mut out).expect("print");

        let printed = String::from_utf8(out).expect("utf8");
        let line = printed.strip_suffix('\n').expect("newline");
        assert!(FUN_FACTS.contains(&line), "unexpected fact: {line}");
    }

    #[tokio::test]
    async fn error_turns_do_not_count_toward_the_tip() {
        let mut view = TerminalView::new(labels(), Duration::ZERO);
        let mut out = Vec::new();
        let turns = vec![
            Turn::greeting("hi"),
            Turn::user("q0"),
            Turn::bot("a0"),
            Turn::user("q1"),
            Turn::error("offline"),
            Turn::user("q2"),
            Turn::bot("a2"),
        ];

        view.render(&snapshot(turns, false), &mut out)
            .await
            .expect("render");

        let printed = String::from_utf8(out).expect("utf8");
        assert!(!printed.contains("(Tip:"));
    }

    #[tokio::test]
    async fn prints_tip_after_third_reply() {
        let mut view = TerminalView::new(labels(), Duration::ZERO);
        let mut out = Vec::new();
        let mut turns = vec![Turn::greeting("hi")];
        for n in 0..3 {
            turns.push(Turn::user(format!("q{n}")));
            turns.push(Turn::bot(format!("a{n}")));
        }

        view.render(&snapshot(turns, false), &mut out)
            .await
            .expect("render");

        let printed = String::from_utf8(out).expect("utf8");
        assert!(printed.ends_with("Bot: a2\n(Tip: You can ask for a fun fact by typing 'fact'!)\n"));
    }
}
