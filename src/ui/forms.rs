use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Fields available within the login form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum LoginField {
    #[default]
    Username,
    Password,
}

/// State for the login/signup screen. The same two fields feed both actions;
/// validation (empty fields, unknown users) happens in the store so the exact
/// failure wording comes from one place.
#[derive(Default, Clone)]
pub(crate) struct LoginForm {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) active: LoginField,
}

impl LoginForm {
    /// Swap focus between the two fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    /// Append a character to the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            LoginField::Username => self.username.push(ch),
            LoginField::Password => self.password.push(ch),
        }
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            LoginField::Username => {
                self.username.pop();
            }
            LoginField::Password => {
                self.password.pop();
            }
        }
    }

    /// Drop the password after an attempt so a failed login never leaves the
    /// secret sitting on screen-adjacent state.
    pub(crate) fn clear_password(&mut self) {
        self.password.clear();
    }

    /// Render one labelled field line, masking the password.
    pub(crate) fn build_line(&self, field_name: &str, field: LoginField) -> Line<'static> {
        let (value, is_active) = match field {
            LoginField::Username => (self.username.clone(), self.active == LoginField::Username),
            LoginField::Password => (
                "*".repeat(self.password.chars().count()),
                self.active == LoginField::Password,
            ),
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let display = if value.is_empty() {
            "<empty>".to_string()
        } else {
            value
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }
}

/// Form state for naming a playlist, used both by "New Playlist" and by the
/// add-to-playlist flow when the target name does not exist yet.
#[derive(Default, Clone)]
pub(crate) struct PlaylistForm {
    pub(crate) name: String,
}

impl PlaylistForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.name.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.name.pop();
    }

    /// Validate and return the trimmed playlist name.
    pub(crate) fn parse_input(&self) -> Result<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Playlist name is required."));
        }
        Ok(name.to_string())
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        let display = if self.name.is_empty() {
            "<required>".to_string()
        } else {
            self.name.clone()
        };
        let style = if self.name.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Yellow)
        };
        Line::from(vec![Span::raw("Name: "), Span::styled(display, style)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_form_routes_input_to_the_active_field() {
        let mut form = LoginForm::default();
        form.push_char('a');
        form.toggle_field();
        form.push_char('p');
        form.push_char('w');
        form.backspace();

        assert_eq!(form.username, "a");
        assert_eq!(form.password, "p");
    }

    #[test]
    fn playlist_form_rejects_blank_names() {
        let mut form = PlaylistForm::default();
        form.push_char(' ');
        assert!(form.parse_input().is_err());

        form.push_char('m');
        assert_eq!(form.parse_input().unwrap(), "m");
    }
}
