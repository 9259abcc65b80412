//! Slash-command parsing
//!
//! A message starting with `/` is only ever a command. Arguments are split on
//! whitespace and handed to the handler unparsed; each handler validates its
//! own and answers with a usage message when they are wrong.

/// One recognized command with its raw arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    MyHistory,
    VerifyPayment(Vec<String>),
    AddResource(Vec<String>),
    Verify(Vec<String>),
    GrantAccess(Vec<String>),
    RemoveResource(Vec<String>),
    EditResource(Vec<String>),
    DeleteSubject(Vec<String>),
    UploadJson,
    Stats,
    Admin,
}

impl Command {
    /// Parse the text after the leading slash. Unknown names yield None and
    /// the message is dropped without a reply.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split_whitespace();
        let name = parts.next()?;
        let args: Vec<String> = parts.map(str::to_string).collect();

        match name {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "my_history" => Some(Command::MyHistory),
            "verify_payment" => Some(Command::VerifyPayment(args)),
            "add_resource" => Some(Command::AddResource(args)),
            "verify" => Some(Command::Verify(args)),
            "grant_access" => Some(Command::GrantAccess(args)),
            "remove_resource" => Some(Command::RemoveResource(args)),
            "edit_resource" => Some(Command::EditResource(args)),
            "delete_subject" => Some(Command::DeleteSubject(args)),
            "upload_json" => Some(Command::UploadJson),
            "stats" => Some(Command::Stats),
            "admin" => Some(Command::Admin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_command_parses() {
        assert_eq!(Command::parse("start"), Some(Command::Start));
        assert_eq!(Command::parse("admin"), Some(Command::Admin));
    }

    #[test]
    fn test_arguments_split_on_whitespace() {
        let parsed = Command::parse("remove_resource CSE211 1 notes");
        assert_eq!(
            parsed,
            Some(Command::RemoveResource(vec![
                "CSE211".to_string(),
                "1".to_string(),
                "notes".to_string(),
            ]))
        );
    }

    #[test]
    fn test_extra_whitespace_ignored() {
        let parsed = Command::parse("verify_payment    TXN99 ");
        assert_eq!(parsed, Some(Command::VerifyPayment(vec!["TXN99".to_string()])));
    }

    #[test]
    fn test_unknown_command_is_none() {
        assert_eq!(Command::parse("frobnicate"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_commands_are_case_sensitive() {
        assert_eq!(Command::parse("Start"), None);
    }
}
