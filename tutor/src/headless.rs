//! Line-oriented command interface.
//!
//! Every line is a `#command` followed by its arguments. Fields that may
//! contain spaces or commas are separated with `|`.

use std::io::{self, BufRead};
use thiserror::Error;
use tutor_core::{
    EnrollmentId, LanguageId, PersistError, Strategy, StoryRequest, Tutor, TutorConfig,
    TutorError, User, VocabId, WordBound,
};

const HELP: &str = "\
Commands:
  #signup <email> <password> <name...>   - Create an account
  #login <email> <password>              - Log in
  #logout                                - Log out
  #languages                             - List available languages
  #enroll <language id>                  - Start learning a language
  #mine                                  - List your languages
  #add <enrollment id> <words> [| meaning [| proficiency]]
                                         - Add comma-separated words
  #vocab <enrollment id> [proficiency]   - List your words
  #story <enrollment id> <random|theme|manual> <max words> [proficiency] [| theme] [| word ids]
                                         - Generate a practice story
  #export                                - Save the last story to a text file
  #help                                  - Show this help
  #quit                                  - Exit";

/// Print usage.
pub fn print_help() {
    println!("{HELP}");
}

/// Errors shown to the user after a command.
#[derive(Debug, Error)]
enum CommandError {
    #[error("{0}")]
    Usage(String),

    #[error("Please log in first")]
    NotLoggedIn,

    #[error(transparent)]
    Tutor(#[from] TutorError),

    #[error("Storage failed: {0}")]
    Persist(#[from] PersistError),
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Signup {
        email: String,
        password: String,
        name: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    Languages,
    Enroll(LanguageId),
    Mine,
    Add {
        enrollment_id: EnrollmentId,
        words: String,
        meaning: Option<String>,
        proficiency: Option<String>,
    },
    Vocab {
        enrollment_id: EnrollmentId,
        proficiency: Option<String>,
    },
    Story(StorySpec),
    Export,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
struct StorySpec {
    enrollment_id: EnrollmentId,
    strategy: Strategy,
    max_words: WordBound,
    proficiency: Option<String>,
    theme: String,
    manual_ids: Vec<VocabId>,
}

impl Command {
    fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let body = line
            .strip_prefix('#')
            .ok_or_else(|| usage("Commands start with '#'. Type #help for a list."))?;
        let (name, rest) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
        let rest = rest.trim();

        match name.to_lowercase().as_str() {
            "signup" => {
                let mut parts = rest.splitn(3, char::is_whitespace);
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(email), Some(password), Some(name)) if !email.is_empty() => {
                        Ok(Command::Signup {
                            email: email.to_string(),
                            password: password.to_string(),
                            name: name.trim().to_string(),
                        })
                    }
                    _ => Err(usage("Usage: #signup <email> <password> <name...>")),
                }
            }
            "login" => match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
                [email, password] => Ok(Command::Login {
                    email: email.to_string(),
                    password: password.to_string(),
                }),
                _ => Err(usage("Usage: #login <email> <password>")),
            },
            "logout" => Ok(Command::Logout),
            "languages" => Ok(Command::Languages),
            "enroll" => rest
                .parse::<LanguageId>()
                .map(Command::Enroll)
                .map_err(|_| usage("Usage: #enroll <language id>")),
            "mine" => Ok(Command::Mine),
            "add" => {
                let (id, fields) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let enrollment_id = id.parse::<EnrollmentId>().map_err(|_| {
                    usage("Usage: #add <enrollment id> <words> [| meaning [| proficiency]]")
                })?;
                let mut fields = fields.split('|').map(str::trim);
                Ok(Command::Add {
                    enrollment_id,
                    words: fields.next().unwrap_or_default().to_string(),
                    meaning: fields.next().filter(|f| !f.is_empty()).map(str::to_string),
                    proficiency: fields.next().filter(|f| !f.is_empty()).map(str::to_string),
                })
            }
            "vocab" => {
                let mut parts = rest.split_whitespace();
                let enrollment_id = parts
                    .next()
                    .and_then(|id| id.parse::<EnrollmentId>().ok())
                    .ok_or_else(|| usage("Usage: #vocab <enrollment id> [proficiency]"))?;
                Ok(Command::Vocab {
                    enrollment_id,
                    proficiency: parts.next().map(str::to_string),
                })
            }
            "story" => parse_story(rest).map(Command::Story),
            "export" => Ok(Command::Export),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(usage(&format!("Unknown command '#{other}'. Type #help for a list."))),
        }
    }

    /// Whether a successful run changes the store.
    fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Signup { .. } | Command::Enroll(_) | Command::Add { .. } | Command::Story(_)
        )
    }
}

fn parse_story(rest: &str) -> Result<StorySpec, CommandError> {
    const USAGE: &str = "Usage: #story <enrollment id> <random|theme|manual> <max words> \
                         [proficiency] [| theme] [| word ids]";

    let mut sections = rest.split('|').map(str::trim);
    let head: Vec<&str> = sections.next().unwrap_or_default().split_whitespace().collect();
    let theme = sections.next().unwrap_or_default().to_string();
    let ids = sections.next().unwrap_or_default();

    let (enrollment_id, strategy, max_words, proficiency) = match head.as_slice() {
        [id, strategy, max] => (*id, *strategy, *max, None),
        [id, strategy, max, proficiency] => (*id, *strategy, *max, Some(proficiency.to_string())),
        _ => return Err(usage(USAGE)),
    };

    let manual_ids = ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse::<VocabId>())
        .collect::<Result<Vec<VocabId>, _>>()
        .map_err(|_| usage("Word ids must be numbers separated by commas"))?;

    Ok(StorySpec {
        enrollment_id: enrollment_id.parse::<EnrollmentId>().map_err(|_| usage(USAGE))?,
        strategy: strategy.parse::<Strategy>().map_err(|e| usage(&format!("{e}")))?,
        max_words: WordBound::from_input(max_words),
        proficiency,
        theme,
        manual_ids,
    })
}

fn usage(message: &str) -> CommandError {
    CommandError::Usage(message.to_string())
}

/// Whether the loop should keep reading.
enum Flow {
    Continue,
    Quit,
}

/// A tutor plus the logged-in learner.
struct Session {
    tutor: Tutor,
    user: Option<User>,
}

impl Session {
    fn user(&self) -> Result<&User, CommandError> {
        self.user.as_ref().ok_or(CommandError::NotLoggedIn)
    }

    async fn execute(&mut self, command: Command) -> Result<Flow, CommandError> {
        match command {
            Command::Signup {
                email,
                password,
                name,
            } => {
                let user = self.tutor.create_user(&name, &email, &password)?;
                println!("[OK] Account created for {} (user {})", user.name, user.id);
            }
            Command::Login { email, password } => {
                let user = self.tutor.authenticate(&email, &password)?;
                println!("[OK] Welcome, {}!", user.name);
                self.user = Some(user);
            }
            Command::Logout => {
                self.user = None;
                println!("[OK] Logged out");
            }
            Command::Languages => {
                for language in self.tutor.languages() {
                    println!("  {}. {}", language.id, language.name);
                }
            }
            Command::Enroll(language_id) => {
                let user_id = self.user()?.id;
                let enrollment = self.tutor.enroll(user_id, language_id)?;
                println!("[OK] Enrollment {}", enrollment.id);
            }
            Command::Mine => {
                let user_id = self.user()?.id;
                let enrollments = self.tutor.list_enrollments(user_id);
                if enrollments.is_empty() {
                    println!("You have not selected any languages yet.");
                }
                for view in enrollments {
                    println!("  {}. {}", view.enrollment_id, view.language_name);
                }
            }
            Command::Add {
                enrollment_id,
                words,
                meaning,
                proficiency,
            } => {
                let user_id = self.user()?.id;
                let added = self.tutor.add_vocabulary(
                    user_id,
                    enrollment_id,
                    &words,
                    meaning.as_deref(),
                    proficiency.as_deref(),
                )?;
                for item in &added {
                    println!("  Added {}: {}", item.id, item.display_label());
                }
                println!("[OK] Total words added: {}", added.len());
            }
            Command::Vocab {
                enrollment_id,
                proficiency,
            } => {
                let user_id = self.user()?.id;
                let items =
                    self.tutor
                        .list_vocabulary(user_id, enrollment_id, proficiency.as_deref())?;
                for item in &items {
                    let level = item.proficiency.as_deref().unwrap_or("-");
                    println!("  {}. {} [{}]", item.id, item.display_label(), level);
                }
                println!("[OK] {} word(s)", items.len());
            }
            Command::Story(spec) => {
                let user_id = self.user()?.id;
                let mut request = StoryRequest::new(spec.enrollment_id, spec.strategy)
                    .with_theme(spec.theme)
                    .with_max_words(spec.max_words)
                    .with_manual_ids(spec.manual_ids);
                request.proficiency = spec.proficiency;

                let story = self.tutor.generate_story(user_id, &request)?;
                println!("{}", "=".repeat(60));
                println!("{}", story.text);
                println!("{}", "=".repeat(60));
                if story.metadata.theme_fallback {
                    println!("(No words matched the theme, so a random selection was used.)");
                }
            }
            Command::Export => match self.tutor.export_current_story().await? {
                Some(path) => println!("[SAVED] Story saved to {}", path.display()),
                None => println!("[ERROR] Generate a story first"),
            },
            Command::Help => print_help(),
            Command::Quit => {
                println!("Goodbye!");
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }
}

/// Run the command loop until EOF or `#quit`.
pub async fn run_headless(config: TutorConfig) -> Result<(), PersistError> {
    let tutor = Tutor::open(config).await?;
    let mut session = Session { tutor, user: None };

    println!("=== Language Tutor ===");
    print_help();
    println!();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("[ERROR] {e}");
                continue;
            }
        };

        if let Err(e) = session.tutor.reload().await {
            println!("[ERROR] Could not load saved state: {e}");
            continue;
        }

        let mutates = command.mutates();
        match session.execute(command).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) if mutates => {
                if let Err(e) = session.tutor.save().await {
                    println!("[ERROR] Could not save: {e}");
                }
            }
            Ok(Flow::Continue) => {}
            Err(e) => println!("[ERROR] {e}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_signup_keeps_full_name() {
        assert_eq!(
            Command::parse("#signup ana@example.com password1 Ana María").unwrap(),
            Command::Signup {
                email: "ana@example.com".to_string(),
                password: "password1".to_string(),
                name: "Ana María".to_string(),
            }
        );
        assert!(Command::parse("#signup ana@example.com").is_err());
    }

    #[test]
    fn test_parse_add_fields() {
        assert_eq!(
            Command::parse("#add 3 hola, adios | greeting | beginner").unwrap(),
            Command::Add {
                enrollment_id: EnrollmentId::new(3),
                words: "hola, adios".to_string(),
                meaning: Some("greeting".to_string()),
                proficiency: Some("beginner".to_string()),
            }
        );
        assert_eq!(
            Command::parse("#add 3 sol").unwrap(),
            Command::Add {
                enrollment_id: EnrollmentId::new(3),
                words: "sol".to_string(),
                meaning: None,
                proficiency: None,
            }
        );
    }

    #[test]
    fn test_parse_story() {
        let Command::Story(spec) =
            Command::parse("#story 1 manual 5 beginner | greetings | 1, 2,3").unwrap()
        else {
            panic!("expected a story command");
        };
        assert_eq!(spec.enrollment_id, EnrollmentId::new(1));
        assert_eq!(spec.strategy, Strategy::Manual);
        assert_eq!(spec.max_words.get(), 5);
        assert_eq!(spec.proficiency.as_deref(), Some("beginner"));
        assert_eq!(spec.theme, "greetings");
        assert_eq!(
            spec.manual_ids,
            vec![VocabId::new(1), VocabId::new(2), VocabId::new(3)]
        );
    }

    #[test]
    fn test_parse_story_defaults() {
        let Command::Story(spec) = Command::parse("#story 2 random abc").unwrap() else {
            panic!("expected a story command");
        };
        assert_eq!(spec.max_words.get(), 20);
        assert!(spec.theme.is_empty());
        assert!(spec.manual_ids.is_empty());
        assert!(Command::parse("#story 2 poem 5").is_err());
        assert!(Command::parse("#story 2 manual 5 | x | a,b").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(Command::parse("hello").is_err());
        assert!(Command::parse("#dance").is_err());
        assert_eq!(Command::parse("#EXIT").unwrap(), Command::Quit);
    }

    #[test]
    fn test_mutating_commands() {
        assert!(Command::parse("#enroll 2").unwrap().mutates());
        assert!(!Command::parse("#login a@b.co password").unwrap().mutates());
        assert!(!Command::parse("#vocab 1").unwrap().mutates());
    }
}
