use std::mem;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::KeyCode;
use log::info;
use open::that as open_folder;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::audio::{AudioPlayer, TagReader};
use crate::db::{
    add_songs_to_playlist, create_playlist, fetch_all_songs, fetch_playlist,
    fetch_playlists_for_user, login, remove_playlist, replace_playlist_songs, signup,
    sync_catalog,
};
use crate::models::{Session, SongDetails};

use super::forms::{LoginField, LoginForm, PlaylistForm};
use super::helpers::{centered_rect, surface_error};
use super::screens::{LibraryScreen, MembershipPicker, PlaylistDetailScreen, PlaylistsScreen};

/// Footer space reserved for status messages and key hints.
const FOOTER_HEIGHT: u16 = 3;
/// Share of the library screen given to the details pane on the right. The
/// 70/30 split mirrors the songs-left, details-right layout users expect from
/// the desktop original.
const DETAILS_PANE_PERCENT: u16 = 30;

/// High-level navigation states. Everything except `Login` implies an active
/// session; logging out always lands back on `Login`.
enum Screen {
    Login(LoginForm),
    Library(LibraryScreen),
    Playlists(PlaylistsScreen),
    PlaylistDetail(PlaylistDetailScreen),
}

/// Fine-grained modal states layered over the current screen.
enum Mode {
    Normal,
    /// Choosing which existing playlist receives `song`.
    PickingPlaylist {
        song: String,
        names: Vec<String>,
        selected: usize,
    },
    /// Typing a playlist name; with `song` set the song is added to the new
    /// playlist, without it the playlist is created empty.
    NamingPlaylist {
        song: Option<String>,
        form: PlaylistForm,
    },
    ConfirmPlaylistDelete {
        name: String,
    },
    /// Checkbox picker persisting through the replace operation.
    EditingMembership(MembershipPicker),
    Searching {
        query: String,
    },
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. Owns the single database
/// connection and the injected audio capabilities; every store call runs
/// synchronously on this thread.
pub struct App {
    conn: Connection,
    music_dir: PathBuf,
    player: Box<dyn AudioPlayer>,
    tag_reader: Box<dyn TagReader>,
    session: Option<Session>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(
        conn: Connection,
        music_dir: PathBuf,
        player: Box<dyn AudioPlayer>,
        tag_reader: Box<dyn TagReader>,
    ) -> Self {
        Self {
            conn,
            music_dir,
            player,
            tag_reader,
            session: None,
            screen: Screen::Login(LoginForm::default()),
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Username of the active session, if any. Screens past login always have
    /// one; the fallback only guards against state-machine mistakes.
    fn current_username(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|session| session.username().to_string())
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::PickingPlaylist {
                song,
                names,
                selected,
            } => self.handle_pick_playlist(code, song, names, selected)?,
            Mode::NamingPlaylist { song, form } => self.handle_naming_playlist(code, song, form)?,
            Mode::ConfirmPlaylistDelete { name } => self.handle_confirm_delete(code, name)?,
            Mode::EditingMembership(picker) => self.handle_edit_membership(code, picker)?,
            Mode::Searching { query } => self.handle_search(code, query)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    /// Ctrl-N: sign up with whatever the login form currently holds. Only
    /// meaningful on the login screen.
    pub fn handle_ctrl_n(&mut self) -> Result<()> {
        let Screen::Login(form) = &self.screen else {
            return Ok(());
        };
        let (username, password) = (form.username.clone(), form.password.clone());

        match signup(&self.conn, &username, &password) {
            Ok(()) => self.set_status("User created successfully.", StatusKind::Info),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
        Ok(())
    }

    /// Ctrl-L: log out. Stops playback, drops the session, and returns to the
    /// login screen; no process restart involved.
    pub fn handle_ctrl_l(&mut self) -> Result<()> {
        if let Some(session) = self.session.take() {
            info!("'{}' logged out", session.username());
            self.player.stop();
            self.screen = Screen::Login(LoginForm::default());
            self.mode = Mode::Normal;
            self.set_status("Logged out.", StatusKind::Info);
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Login(_) => self.handle_login_key(code, exit),
            Screen::Library(_) => self.handle_library_key(code, exit),
            Screen::Playlists(_) => self.handle_playlists_key(code, exit),
            Screen::PlaylistDetail(_) => self.handle_detail_key(code, exit),
        }
    }

    fn handle_login_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Enter => {
                let (username, password) = match &self.screen {
                    Screen::Login(form) => (form.username.clone(), form.password.clone()),
                    _ => return Ok(Mode::Normal),
                };
                self.attempt_login(&username, &password)?;
            }
            other => {
                if let Screen::Login(form) = &mut self.screen {
                    match other {
                        KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
                        KeyCode::Backspace => form.backspace(),
                        KeyCode::Char(ch) => {
                            form.push_char(ch);
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(Mode::Normal)
    }

    fn handle_library_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
            }
            KeyCode::Up => {
                if let Screen::Library(library) = &mut self.screen {
                    library.move_selection(-1);
                }
            }
            KeyCode::Down => {
                if let Screen::Library(library) = &mut self.screen {
                    library.move_selection(1);
                }
            }
            KeyCode::Enter => {
                if let Some(song) = self.library_selection() {
                    let details =
                        SongDetails::probe(self.tag_reader.as_ref(), &self.music_dir, &song);
                    if let Screen::Library(library) = &mut self.screen {
                        library.details = Some(details);
                    }
                } else {
                    self.set_status("No song selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('p') => {
                if let Some(song) = self.library_selection() {
                    self.play_song(&song);
                } else {
                    self.set_status("No song selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('s') => {
                self.player.stop();
                self.set_status("Playback stopped.", StatusKind::Info);
            }
            KeyCode::Char('a') => {
                if let Some(song) = self.library_selection() {
                    return self.open_playlist_picker(song);
                }
                self.set_status("No song selected.", StatusKind::Error);
            }
            KeyCode::Char('r') => {
                self.resync_catalog();
            }
            KeyCode::Char('o') => {
                if let Err(err) = open_folder(&self.music_dir) {
                    self.set_status(
                        format!("Could not open music folder: {err}"),
                        StatusKind::Error,
                    );
                }
            }
            KeyCode::Char('/') => {
                let query = match &self.screen {
                    Screen::Library(library) => library.filter.clone().unwrap_or_default(),
                    _ => String::new(),
                };
                return Ok(Mode::Searching { query });
            }
            KeyCode::Tab => {
                self.open_playlists_screen();
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_playlists_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
            }
            KeyCode::Up => {
                if let Screen::Playlists(playlists) = &mut self.screen {
                    playlists.move_selection(-1);
                }
            }
            KeyCode::Down => {
                if let Screen::Playlists(playlists) = &mut self.screen {
                    playlists.move_selection(1);
                }
            }
            KeyCode::Enter => {
                if let Some(name) = self.playlists_selection() {
                    self.open_playlist_detail(name);
                } else {
                    self.set_status("No playlist selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('n') => {
                return Ok(Mode::NamingPlaylist {
                    song: None,
                    form: PlaylistForm::default(),
                });
            }
            KeyCode::Char('d') => {
                if let Some(name) = self.playlists_selection() {
                    return Ok(Mode::ConfirmPlaylistDelete { name });
                }
                self.set_status("No playlist selected.", StatusKind::Error);
            }
            KeyCode::Tab | KeyCode::Esc => {
                self.open_library_screen();
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_detail_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
            }
            KeyCode::Up => {
                if let Screen::PlaylistDetail(detail) = &mut self.screen {
                    detail.move_selection(-1);
                }
            }
            KeyCode::Down => {
                if let Screen::PlaylistDetail(detail) = &mut self.screen {
                    detail.move_selection(1);
                }
            }
            KeyCode::Char('p') => {
                let song = match &self.screen {
                    Screen::PlaylistDetail(detail) => detail.current_song().cloned(),
                    _ => None,
                };
                if let Some(song) = song {
                    self.play_song(&song);
                } else {
                    self.set_status("No song selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('s') => {
                self.player.stop();
                self.set_status("Playback stopped.", StatusKind::Info);
            }
            KeyCode::Char('e') => {
                if let Screen::PlaylistDetail(detail) = &self.screen {
                    let catalog = match fetch_all_songs(&self.conn) {
                        Ok(songs) => songs,
                        Err(err) => {
                            let message = surface_error(&err);
                            self.set_status(message, StatusKind::Error);
                            return Ok(Mode::Normal);
                        }
                    };
                    return Ok(Mode::EditingMembership(MembershipPicker::new(
                        detail.name.clone(),
                        catalog,
                        &detail.songs,
                    )));
                }
            }
            KeyCode::Tab | KeyCode::Esc => {
                self.open_playlists_screen();
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_pick_playlist(
        &mut self,
        code: KeyCode,
        song: String,
        names: Vec<String>,
        mut selected: usize,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Up => {
                selected = selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if selected + 1 < names.len() {
                    selected += 1;
                }
            }
            KeyCode::Char('n') => {
                return Ok(Mode::NamingPlaylist {
                    song: Some(song),
                    form: PlaylistForm::default(),
                });
            }
            KeyCode::Enter => {
                let Some(name) = names.get(selected).cloned() else {
                    return Ok(Mode::NamingPlaylist {
                        song: Some(song),
                        form: PlaylistForm::default(),
                    });
                };
                self.add_song_to_playlist(&song, &name);
                return Ok(Mode::Normal);
            }
            _ => {}
        }
        Ok(Mode::PickingPlaylist {
            song,
            names,
            selected,
        })
    }

    fn handle_naming_playlist(
        &mut self,
        code: KeyCode,
        song: Option<String>,
        mut form: PlaylistForm,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            KeyCode::Enter => {
                let name = match form.parse_input() {
                    Ok(name) => name,
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        return Ok(Mode::NamingPlaylist { song, form });
                    }
                };

                match song {
                    Some(song) => self.add_song_to_playlist(&song, &name),
                    None => {
                        let Some(username) = self.current_username() else {
                            return Ok(Mode::Normal);
                        };
                        match create_playlist(&self.conn, &username, &name) {
                            Ok(_) => {
                                self.set_status(
                                    format!("Created playlist '{name}'."),
                                    StatusKind::Info,
                                );
                            }
                            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                        }
                    }
                }

                if matches!(self.screen, Screen::Playlists(_)) {
                    self.open_playlists_screen();
                }
                return Ok(Mode::Normal);
            }
            _ => {}
        }
        Ok(Mode::NamingPlaylist { song, form })
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, name: String) -> Result<Mode> {
        match code {
            KeyCode::Enter | KeyCode::Char('y') => {
                let Some(username) = self.current_username() else {
                    return Ok(Mode::Normal);
                };
                match remove_playlist(&self.conn, &username, &name) {
                    Ok(()) => {
                        self.set_status(format!("Removed playlist '{name}'."), StatusKind::Info);
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                self.open_playlists_screen();
                Ok(Mode::Normal)
            }
            KeyCode::Esc | KeyCode::Char('n') => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmPlaylistDelete { name }),
        }
    }

    fn handle_edit_membership(
        &mut self,
        code: KeyCode,
        mut picker: MembershipPicker,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::Char(' ') => picker.toggle_current(),
            KeyCode::Enter => {
                let Some(username) = self.current_username() else {
                    return Ok(Mode::Normal);
                };
                let chosen = picker.chosen();
                match replace_playlist_songs(&self.conn, &username, &picker.playlist, &chosen) {
                    Ok(()) => {
                        self.set_status(
                            format!("Saved {} songs to '{}'.", chosen.len(), picker.playlist),
                            StatusKind::Info,
                        );
                        self.open_playlist_detail(picker.playlist.clone());
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                return Ok(Mode::Normal);
            }
            _ => {}
        }
        Ok(Mode::EditingMembership(picker))
    }

    fn handle_search(&mut self, code: KeyCode, mut query: String) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                if let Screen::Library(library) = &mut self.screen {
                    library.set_filter(None);
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Backspace => {
                query.pop();
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    query.push(ch);
                }
            }
            _ => {}
        }

        if let Screen::Library(library) = &mut self.screen {
            library.set_filter(Some(query.clone()));
        }
        Ok(Mode::Searching { query })
    }

    /// Log in, run the catalog sync the way the desktop flow did on every
    /// successful login, and land on the library screen.
    fn attempt_login(&mut self, username: &str, password: &str) -> Result<()> {
        match login(&self.conn, username, password) {
            Ok(session) => {
                self.session = Some(session);
                self.resync_catalog();
                self.open_library_screen();
                self.set_status("Login successful.", StatusKind::Info);
            }
            Err(err) => {
                let message = surface_error(&err);
                if let Screen::Login(form) = &mut self.screen {
                    form.clear_password();
                    form.active = LoginField::Password;
                }
                self.set_status(message, StatusKind::Error);
            }
        }
        Ok(())
    }

    fn library_selection(&self) -> Option<String> {
        match &self.screen {
            Screen::Library(library) => library.current_song().cloned(),
            _ => None,
        }
    }

    fn playlists_selection(&self) -> Option<String> {
        match &self.screen {
            Screen::Playlists(playlists) => playlists.current_name().cloned(),
            _ => None,
        }
    }

    fn play_song(&mut self, song: &str) {
        let path = self.music_dir.join(song);
        match self.player.play(&path) {
            Ok(()) => self.set_status(format!("Playing '{song}'."), StatusKind::Info),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn add_song_to_playlist(&mut self, song: &str, name: &str) {
        let Some(username) = self.current_username() else {
            return;
        };
        match add_songs_to_playlist(&self.conn, &username, name, &[song.to_string()]) {
            Ok(()) => self.set_status(format!("Added '{song}' to '{name}'."), StatusKind::Info),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    /// Mirror the music directory into the catalog and refresh the library
    /// view when it is showing.
    fn resync_catalog(&mut self) {
        let added = match sync_catalog(&self.conn, &self.music_dir) {
            Ok(added) => added,
            Err(err) => {
                let message = surface_error(&err);
                self.set_status(message, StatusKind::Error);
                return;
            }
        };

        match fetch_all_songs(&self.conn) {
            Ok(songs) => {
                if let Screen::Library(library) = &mut self.screen {
                    library.reload(songs);
                }
                self.set_status(format!("Catalog synced ({added} added)."), StatusKind::Info);
            }
            Err(err) => {
                let message = surface_error(&err);
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    fn open_library_screen(&mut self) {
        match fetch_all_songs(&self.conn) {
            Ok(songs) => self.screen = Screen::Library(LibraryScreen::new(songs)),
            Err(err) => {
                let message = surface_error(&err);
                self.screen = Screen::Library(LibraryScreen::new(Vec::new()));
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    /// Load the session user's playlists. The store reports a user with zero
    /// playlists as an error; the screen still opens and shows that message
    /// in place of the list, matching how the original rendered it.
    fn open_playlists_screen(&mut self) {
        let Some(username) = self.current_username() else {
            return;
        };
        self.screen = match fetch_playlists_for_user(&self.conn, &username) {
            Ok(names) => Screen::Playlists(PlaylistsScreen::new(names, None)),
            Err(err) => Screen::Playlists(PlaylistsScreen::new(
                Vec::new(),
                Some(surface_error(&err)),
            )),
        };
    }

    fn open_playlist_detail(&mut self, name: String) {
        match fetch_playlist(&self.conn, &name) {
            Ok(songs) => self.screen = Screen::PlaylistDetail(PlaylistDetailScreen::new(name, songs)),
            Err(err) => {
                let message = surface_error(&err);
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    fn open_playlist_picker(&mut self, song: String) -> Result<Mode> {
        let Some(username) = self.current_username() else {
            return Ok(Mode::Normal);
        };

        // A user with no playlists goes straight to naming a new one.
        match fetch_playlists_for_user(&self.conn, &username) {
            Ok(names) => Ok(Mode::PickingPlaylist {
                song,
                names,
                selected: 0,
            }),
            Err(_) => Ok(Mode::NamingPlaylist {
                song: Some(song),
                form: PlaylistForm::default(),
            }),
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Login(form) => self.draw_login(frame, content_area, form),
            Screen::Library(library) => self.draw_library(frame, content_area, library),
            Screen::Playlists(playlists) => self.draw_playlists(frame, content_area, playlists),
            Screen::PlaylistDetail(detail) => self.draw_detail(frame, content_area, detail),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::PickingPlaylist {
                song,
                names,
                selected,
            } => self.draw_playlist_picker(frame, area, song, names, *selected),
            Mode::NamingPlaylist { song, form } => self.draw_name_form(frame, area, song, form),
            Mode::ConfirmPlaylistDelete { name } => self.draw_confirm_delete(frame, area, name),
            Mode::EditingMembership(picker) => self.draw_membership_picker(frame, area, picker),
            Mode::Searching { query } => self.draw_search_bar(frame, area, query),
            Mode::Normal => {}
        }
    }

    fn draw_login(&self, frame: &mut Frame, area: Rect, form: &LoginForm) {
        let dialog = centered_rect(50, 40, area);
        let lines = vec![
            Line::from(""),
            form.build_line("Username", LoginField::Username),
            form.build_line("Password", LoginField::Password),
            Line::from(""),
            Line::from(Span::styled(
                "Enter: log in   Ctrl-N: sign up   Tab: switch field",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let widget = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Mixtape Manager "),
            );
        frame.render_widget(Clear, dialog);
        frame.render_widget(widget, dialog);
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect, library: &LibraryScreen) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(100 - DETAILS_PANE_PERCENT),
                Constraint::Percentage(DETAILS_PANE_PERCENT),
            ])
            .split(area);

        let title = match &library.filter {
            Some(filter) if !filter.is_empty() => {
                format!(" All Songs ({}) [filter: {}] ", library.filtered.len(), filter)
            }
            _ => format!(" All Songs ({}) ", library.filtered.len()),
        };

        if library.filtered.is_empty() {
            let message = if library.songs.is_empty() {
                "No songs found. Drop files into the music folder and press 'r'."
            } else {
                "No songs match the filter."
            };
            let widget = Paragraph::new(message)
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(widget, chunks[0]);
        } else {
            let items: Vec<ListItem> = library
                .filtered
                .iter()
                .map(|song| ListItem::new(song.clone()))
                .collect();
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(title))
                .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .highlight_symbol("> ");
            let mut state = ListState::default();
            state.select(Some(library.selected));
            frame.render_stateful_widget(list, chunks[0], &mut state);
        }

        self.draw_details_pane(frame, chunks[1], library.details.as_ref());
    }

    fn draw_details_pane(&self, frame: &mut Frame, area: Rect, details: Option<&SongDetails>) {
        let lines = match details {
            Some(details) => vec![
                Line::from(format!("Song Title: {}", details.title)),
                Line::from(format!("Artist: {}", details.artist)),
                Line::from(format!(
                    "Duration: {}",
                    details.duration.as_deref().unwrap_or("unknown")
                )),
            ],
            None => vec![Line::from("Select a song and press Enter to view details.")],
        };

        let widget = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Now Viewing "));
        frame.render_widget(widget, area);
    }

    fn draw_playlists(&self, frame: &mut Frame, area: Rect, playlists: &PlaylistsScreen) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Your Playlists ");

        if let Some(error) = &playlists.error {
            let widget = Paragraph::new(error.clone())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: false })
                .block(block);
            frame.render_widget(widget, area);
            return;
        }

        let items: Vec<ListItem> = playlists
            .names
            .iter()
            .map(|name| ListItem::new(name.clone()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(playlists.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect, detail: &PlaylistDetailScreen) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Songs in {} ", detail.name));

        if detail.songs.is_empty() {
            let widget = Paragraph::new("No songs in this playlist. Press 'e' to add some.")
                .block(block);
            frame.render_widget(widget, area);
            return;
        }

        let items: Vec<ListItem> = detail
            .songs
            .iter()
            .map(|song| ListItem::new(song.clone()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(detail.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let line = if let Some(status) = &self.status {
            Line::from(Span::styled(status.text.clone(), status.kind.style()))
        } else {
            let hints = match &self.screen {
                Screen::Login(_) => "Enter: log in | Ctrl-N: sign up | Esc: quit",
                Screen::Library(_) => {
                    "Enter: details | p/s: play/stop | a: add to playlist | /: filter | r: sync | o: folder | Tab: playlists | Ctrl-L: log out | q: quit"
                }
                Screen::Playlists(_) => {
                    "Enter: open | n: new | d: delete | Tab: library | Ctrl-L: log out | q: quit"
                }
                Screen::PlaylistDetail(_) => {
                    "e: edit songs | p/s: play/stop | Esc: back | q: quit"
                }
            };
            Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
        };

        let widget = Paragraph::new(line)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(widget, area);
    }

    fn draw_playlist_picker(
        &self,
        frame: &mut Frame,
        area: Rect,
        song: &str,
        names: &[String],
        selected: usize,
    ) {
        let dialog = centered_rect(60, 50, area);
        let items: Vec<ListItem> = names
            .iter()
            .map(|name| ListItem::new(name.clone()))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Add '{song}' to...  (n: new playlist) ")),
            )
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_widget(Clear, dialog);
        frame.render_stateful_widget(list, dialog, &mut state);
    }

    fn draw_name_form(&self, frame: &mut Frame, area: Rect, song: &Option<String>, form: &PlaylistForm) {
        let dialog = centered_rect(50, 25, area);
        let title = match song {
            Some(song) => format!(" New playlist for '{song}' "),
            None => " New Playlist ".to_string(),
        };
        let lines = vec![
            Line::from(""),
            form.build_line(),
            Line::from(""),
            Line::from(Span::styled(
                "Enter: save   Esc: cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let widget = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(Clear, dialog);
        frame.render_widget(widget, dialog);
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, name: &str) {
        let dialog = centered_rect(50, 25, area);
        let lines = vec![
            Line::from(format!("Delete playlist '{name}'?")),
            Line::from(""),
            Line::from(Span::styled(
                "Enter/y: delete   Esc/n: cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let widget = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Confirm "));
        frame.render_widget(Clear, dialog);
        frame.render_widget(widget, dialog);
    }

    fn draw_membership_picker(&self, frame: &mut Frame, area: Rect, picker: &MembershipPicker) {
        let dialog = centered_rect(70, 70, area);
        let items: Vec<ListItem> = picker
            .entries
            .iter()
            .map(|entry| {
                let mark = if entry.checked { "[x]" } else { "[ ]" };
                ListItem::new(format!("{mark} {}", entry.filename))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(format!(
                " Edit '{}'  (Space: toggle, Enter: save, Esc: cancel) ",
                picker.playlist
            )))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(picker.selected));
        frame.render_widget(Clear, dialog);
        frame.render_stateful_widget(list, dialog, &mut state);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, query: &str) {
        let bar = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: area.height.min(3),
        };
        let widget = Paragraph::new(format!("/{query}"))
            .block(Block::default().borders(Borders::ALL).title(" Filter "));
        frame.render_widget(Clear, bar);
        frame.render_widget(widget, bar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullPlayer;
    use crate::db::{signup, test_connection};
    use std::path::Path;
    use std::time::Duration;

    struct NoTags;

    impl TagReader for NoTags {
        fn duration(&self, _path: &Path) -> Option<Duration> {
            None
        }
    }

    fn test_app(dir: &Path) -> App {
        App::new(
            test_connection(),
            dir.join("Songs"),
            Box::new(NullPlayer),
            Box::new(NoTags),
        )
    }

    fn type_str(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    #[test]
    fn login_flow_reaches_the_library_with_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        signup(&app.conn, "alice", "hunter2").unwrap();

        type_str(&mut app, "alice");
        app.handle_key(KeyCode::Tab).unwrap();
        type_str(&mut app, "hunter2");
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(app.current_username().as_deref(), Some("alice"));
        assert!(matches!(app.screen, Screen::Library(_)));
        // Login triggered a sync, so the music directory now exists.
        assert!(dir.path().join("Songs").is_dir());
    }

    #[test]
    fn failed_login_stays_on_the_form_and_clears_the_password() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        signup(&app.conn, "alice", "hunter2").unwrap();

        type_str(&mut app, "alice");
        app.handle_key(KeyCode::Tab).unwrap();
        type_str(&mut app, "wrong");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(app.session.is_none());
        let Screen::Login(form) = &app.screen else {
            panic!("expected to stay on the login screen");
        };
        assert_eq!(form.username, "alice");
        assert!(form.password.is_empty());
        assert_eq!(
            app.status.as_ref().map(|s| s.text.as_str()),
            Some("Incorrect username or password.")
        );
    }

    #[test]
    fn ctrl_n_signs_up_from_the_login_form() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        type_str(&mut app, "bob");
        app.handle_key(KeyCode::Tab).unwrap();
        type_str(&mut app, "pw");
        app.handle_ctrl_n().unwrap();

        assert_eq!(
            app.status.as_ref().map(|s| s.text.as_str()),
            Some("User created successfully.")
        );
        // The account works immediately.
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.current_username().as_deref(), Some("bob"));
    }

    #[test]
    fn ctrl_l_logs_out_back_to_the_login_screen() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        signup(&app.conn, "alice", "hunter2").unwrap();

        type_str(&mut app, "alice");
        app.handle_key(KeyCode::Tab).unwrap();
        type_str(&mut app, "hunter2");
        app.handle_key(KeyCode::Enter).unwrap();
        app.handle_ctrl_l().unwrap();

        assert!(app.session.is_none());
        assert!(matches!(app.screen, Screen::Login(_)));
    }
}
