//! Console command parsing.
//!
//! Submission fields are separated with `|` so titles and artists can
//! contain spaces:
//!
//! ```text
//! submit Bohemian Rhapsody | Queen | https://open.spotify.com/track/4u7EnebtmKWzUH433cf5Qv | freddie
//! ```

use classradio_core::TrackSubmission;

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the ranked queue
    Queue,
    /// Queue a new track
    Submit(SubmitArgs),
    /// Vote for the track at a 1-based queue position
    Vote { position: usize },
    /// Broadcast the track at a 1-based queue position
    Play { position: usize },
    /// Stop the broadcast
    Stop,
    /// Show the now-playing slot
    NowPlaying,
    /// Show usage
    Help,
    /// Exit the console
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitArgs {
    pub title: String,
    pub artist: String,
    pub spotify_url: String,
    pub submitted_by: Option<String>,
}

impl From<SubmitArgs> for TrackSubmission {
    fn from(args: SubmitArgs) -> Self {
        let submission = Self::new(args.title, args.artist, args.spotify_url);
        match args.submitted_by {
            Some(name) => submission.with_submitter(name),
            None => submission,
        }
    }
}

/// Usage text printed by `help` and on parse errors
pub const USAGE: &str = "\
commands:
  queue                                        show the ranked queue
  submit <title> | <artist> | <url> [| <name>] queue a track
  vote <n>                                     vote for queue entry #n
  play <n>                                     broadcast queue entry #n
  np                                           show what's playing
  stop                                         stop the broadcast
  help                                         show this text
  quit                                         exit";

impl Command {
    /// Parse a console line. Empty lines parse to `None` and are ignored.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message describing what was wrong with the
    /// line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "queue" | "list" | "q" => Self::Queue,
            "submit" | "add" => Self::Submit(parse_submit(rest)?),
            "vote" | "v" => Self::Vote {
                position: parse_position(rest)?,
            },
            "play" | "p" => Self::Play {
                position: parse_position(rest)?,
            },
            "stop" => Self::Stop,
            "np" | "nowplaying" | "now" => Self::NowPlaying,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command: {other} (try 'help')")),
        };
        Ok(Some(command))
    }
}

fn parse_submit(rest: &str) -> Result<SubmitArgs, String> {
    let mut fields = rest.split('|').map(str::trim);
    let (Some(title), Some(artist), Some(url)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err("usage: submit <title> | <artist> | <url> [| <name>]".to_string());
    };
    let submitted_by = fields.next().filter(|s| !s.is_empty()).map(String::from);

    if fields.next().is_some() {
        return Err(
            "too many fields; usage: submit <title> | <artist> | <url> [| <name>]".to_string(),
        );
    }

    Ok(SubmitArgs {
        title: title.to_string(),
        artist: artist.to_string(),
        spotify_url: url.to_string(),
        submitted_by,
    })
}

fn parse_position(rest: &str) -> Result<usize, String> {
    let position: usize = rest
        .parse()
        .map_err(|_| format!("expected a queue position, got '{rest}'"))?;
    if position == 0 {
        return Err("queue positions start at 1".to_string());
    }
    Ok(position)
}
