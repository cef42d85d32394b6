//! Menu items.
//!
//! A [`MenuItem`] is the mutable record describing one row of a menu or one
//! entry of a menu bar. Items are shared as `Arc<MenuItem>`; every field is
//! interior-mutable and every effective change is published on
//! [`MenuItem::changed`] as an [`ItemChanged`] before the setter returns.
//! Setting a field to its current value publishes nothing.
//!
//! # Example
//!
//! ```
//! use horizon_menus::{ItemField, ItemType, MenuItem};
//! use std::sync::Arc;
//!
//! let item = Arc::new(MenuItem::new().with_text("&Open"));
//! item.changed.connect(|change| {
//!     assert_eq!(change.field, ItemField::Checked);
//! });
//! item.set_checked(true);
//!
//! assert_eq!(item.mnemonic(), Some('o'));
//! assert_eq!(item.item_type(), ItemType::Normal);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use horizon_menus_core::{Property, Signal};
use serde_json::Value;

use crate::host::MenuId;

// ============================================================================
// Item Type
// ============================================================================

/// The kind of a menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemType {
    /// A plain triggerable item.
    #[default]
    Normal,
    /// An item with a checkmark.
    Check,
    /// A visual divider; never selectable.
    Separator,
    /// An item that opens a child menu. Inferred from the submenu field.
    Submenu,
}

impl ItemType {
    /// The lowercase name used in templates and class tokens.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Check => "check",
            Self::Separator => "separator",
            Self::Submenu => "submenu",
        }
    }
}

// ============================================================================
// Commands and Handlers
// ============================================================================

/// An executable bound to a menu item.
///
/// When an item carries a command, the item is only enabled while
/// [`can_execute`](Command::can_execute) returns `true` for the item's
/// command arguments.
pub trait Command: Send + Sync {
    /// Whether the command can run with `args`.
    fn can_execute(&self, _args: &Value) -> bool {
        true
    }

    /// Run the command.
    fn execute(&self, args: &Value);
}

/// A shared handle to a [`Command`], compared by identity.
#[derive(Clone)]
pub struct CommandRef(Arc<dyn Command>);

impl CommandRef {
    /// Wrap a command.
    pub fn new(command: impl Command + 'static) -> Self {
        Self(Arc::new(command))
    }

    /// Wrap an already shared command.
    pub fn from_arc(command: Arc<dyn Command>) -> Self {
        Self(command)
    }

    /// Whether the command can run with `args`.
    pub fn can_execute(&self, args: &Value) -> bool {
        self.0.can_execute(args)
    }

    /// Run the command.
    pub fn execute(&self, args: &Value) {
        self.0.execute(args);
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for CommandRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl fmt::Debug for CommandRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandRef({:p})", self.addr())
    }
}

/// A [`Command`] built from a closure, with a switchable enabled state.
pub struct DelegateCommand {
    execute: Box<dyn Fn(&Value) + Send + Sync>,
    enabled: AtomicBool,
}

impl DelegateCommand {
    /// Create an enabled command running `execute`.
    pub fn new<F>(execute: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Self {
            execute: Box::new(execute),
            enabled: AtomicBool::new(true),
        }
    }

    /// Enable or disable the command.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Whether the command is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

impl Command for DelegateCommand {
    fn can_execute(&self, _args: &Value) -> bool {
        self.is_enabled()
    }

    fn execute(&self, args: &Value) {
        (self.execute)(args);
    }
}

/// A callback invoked when an item is triggered, compared by identity.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(&MenuItem) + Send + Sync>);

impl Handler {
    /// Wrap a callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&MenuItem) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invoke the callback for `item`.
    pub fn call(&self, item: &MenuItem) {
        (self.0)(item);
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", self.addr())
    }
}

// ============================================================================
// Change Notification
// ============================================================================

/// The field an [`ItemChanged`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemField {
    Type,
    Text,
    Icon,
    Shortcut,
    ClassName,
    Disabled,
    Checked,
    Hidden,
    Command,
    CommandArgs,
    Handler,
    Submenu,
}

impl ItemField {
    /// The field's name as used in templates.
    pub fn name(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Text => "text",
            Self::Icon => "icon",
            Self::Shortcut => "shortcut",
            Self::ClassName => "className",
            Self::Disabled => "disabled",
            Self::Checked => "checked",
            Self::Hidden => "hidden",
            Self::Command => "command",
            Self::CommandArgs => "commandArgs",
            Self::Handler => "handler",
            Self::Submenu => "submenu",
        }
    }
}

/// A field value carried by an [`ItemChanged`].
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValue {
    Type(ItemType),
    Text(String),
    Flag(bool),
    Command(Option<CommandRef>),
    Args(Value),
    Handler(Option<Handler>),
    Submenu(Option<MenuId>),
}

/// A single field change on a [`MenuItem`].
#[derive(Debug, Clone, PartialEq)]
pub struct ItemChanged {
    pub field: ItemField,
    pub old: ItemValue,
    pub new: ItemValue,
}

impl ItemChanged {
    /// The changed field's name.
    pub fn name(&self) -> &'static str {
        self.field.name()
    }
}

// ============================================================================
// Mnemonics
// ============================================================================

/// Result of parsing mnemonic text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MnemonicText {
    /// Text with mnemonic markers removed and `&&` collapsed to `&`.
    pub display_text: String,
    /// The mnemonic character, lowercased.
    pub mnemonic: Option<char>,
    /// Byte index of the mnemonic character in `display_text`.
    pub mnemonic_index: Option<usize>,
}

/// Parse text containing mnemonic markers.
///
/// The character following the first unescaped `&` is the mnemonic. `&&`
/// stands for a literal ampersand, and a lone `&` at the end is kept.
pub fn parse_mnemonic(text: &str) -> MnemonicText {
    let mut display_text = String::with_capacity(text.len());
    let mut mnemonic: Option<char> = None;
    let mut mnemonic_index: Option<usize> = None;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            display_text.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some('&') => {
                display_text.push('&');
                chars.next();
            }
            Some(next_ch) => {
                if mnemonic.is_none() {
                    mnemonic = next_ch.to_lowercase().next();
                    mnemonic_index = Some(display_text.len());
                }
                display_text.push(next_ch);
                chars.next();
            }
            None => display_text.push('&'),
        }
    }

    MnemonicText {
        display_text,
        mnemonic,
        mnemonic_index,
    }
}

/// Case-insensitive character comparison.
pub(crate) fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a.to_lowercase().eq(b.to_lowercase())
}

// ============================================================================
// MenuItem
// ============================================================================

/// One row of a menu or one entry of a menu bar.
pub struct MenuItem {
    item_type: Property<ItemType>,
    text: Property<String>,
    icon: Property<String>,
    shortcut: Property<String>,
    class_name: Property<String>,
    disabled: Property<bool>,
    checked: Property<bool>,
    hidden: Property<bool>,
    command: Property<Option<CommandRef>>,
    command_args: Property<Value>,
    handler: Property<Option<Handler>>,
    submenu: Property<Option<MenuId>>,

    /// Emitted after any field changes value.
    pub changed: Signal<ItemChanged>,
}

impl MenuItem {
    /// Create a normal item with empty text.
    pub fn new() -> Self {
        Self {
            item_type: Property::new(ItemType::Normal),
            text: Property::default(),
            icon: Property::default(),
            shortcut: Property::default(),
            class_name: Property::default(),
            disabled: Property::new(false),
            checked: Property::new(false),
            hidden: Property::new(false),
            command: Property::new(None),
            command_args: Property::new(Value::Null),
            handler: Property::new(None),
            submenu: Property::new(None),
            changed: Signal::new(),
        }
    }

    /// Create a separator item.
    pub fn separator() -> Self {
        Self::new().with_type(ItemType::Separator)
    }

    // =========================================================================
    // Builder Pattern
    // =========================================================================

    /// Set the item type using builder pattern.
    pub fn with_type(self, item_type: ItemType) -> Self {
        self.item_type.set_silent(item_type);
        self
    }

    /// Set the text using builder pattern.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.text.set_silent(text.into());
        self
    }

    /// Set the icon class using builder pattern.
    pub fn with_icon(self, icon: impl Into<String>) -> Self {
        self.icon.set_silent(icon.into());
        self
    }

    /// Set the shortcut text using builder pattern.
    pub fn with_shortcut(self, shortcut: impl Into<String>) -> Self {
        self.shortcut.set_silent(shortcut.into());
        self
    }

    /// Set the extra class name using builder pattern.
    pub fn with_class_name(self, class_name: impl Into<String>) -> Self {
        self.class_name.set_silent(class_name.into());
        self
    }

    /// Set the disabled flag using builder pattern.
    pub fn with_disabled(self, disabled: bool) -> Self {
        self.disabled.set_silent(disabled);
        self
    }

    /// Set the checked flag using builder pattern.
    pub fn with_checked(self, checked: bool) -> Self {
        self.checked.set_silent(checked);
        self
    }

    /// Set the hidden flag using builder pattern.
    pub fn with_hidden(self, hidden: bool) -> Self {
        self.hidden.set_silent(hidden);
        self
    }

    /// Bind a command and its arguments using builder pattern.
    pub fn with_command(self, command: CommandRef, args: Value) -> Self {
        self.command.set_silent(Some(command));
        self.command_args.set_silent(args);
        self
    }

    /// Set the trigger callback using builder pattern.
    pub fn with_handler<F>(self, handler: F) -> Self
    where
        F: Fn(&MenuItem) + Send + Sync + 'static,
    {
        self.handler.set_silent(Some(Handler::new(handler)));
        self
    }

    /// Attach a submenu using builder pattern.
    ///
    /// A normal item becomes a submenu item.
    pub fn with_submenu(self, submenu: MenuId) -> Self {
        self.submenu.set_silent(Some(submenu));
        if self.item_type.get() == ItemType::Normal {
            self.item_type.set_silent(ItemType::Submenu);
        }
        self
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// The item type.
    pub fn item_type(&self) -> ItemType {
        self.item_type.get()
    }

    /// The raw text, including mnemonic markers.
    pub fn text(&self) -> String {
        self.text.get()
    }

    /// The icon class.
    pub fn icon(&self) -> String {
        self.icon.get()
    }

    /// The shortcut label.
    pub fn shortcut(&self) -> String {
        self.shortcut.get()
    }

    /// Extra class names applied to the item's node.
    pub fn class_name(&self) -> String {
        self.class_name.get()
    }

    /// Whether the item is explicitly disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    /// Whether the item is checked.
    pub fn is_checked(&self) -> bool {
        self.checked.get()
    }

    /// Whether the item is hidden.
    pub fn is_hidden(&self) -> bool {
        self.hidden.get()
    }

    /// The bound command.
    pub fn command(&self) -> Option<CommandRef> {
        self.command.get()
    }

    /// Arguments passed to the bound command.
    pub fn command_args(&self) -> Value {
        self.command_args.get()
    }

    /// The trigger callback.
    pub fn handler(&self) -> Option<Handler> {
        self.handler.get()
    }

    /// The attached submenu.
    pub fn submenu(&self) -> Option<MenuId> {
        self.submenu.get()
    }

    /// Whether this item is a separator.
    pub fn is_separator(&self) -> bool {
        self.item_type() == ItemType::Separator
    }

    /// Whether the item can be interacted with.
    ///
    /// Separators are never enabled. An item with a command is enabled only
    /// while the command can execute.
    pub fn is_enabled(&self) -> bool {
        if self.is_separator() || self.is_disabled() {
            return false;
        }
        match self.command() {
            Some(command) => self
                .command_args
                .with(|args| command.can_execute(args)),
            None => true,
        }
    }

    /// The mnemonic character, lowercased.
    pub fn mnemonic(&self) -> Option<char> {
        self.text.with(|text| parse_mnemonic(text).mnemonic)
    }

    /// Whether `key` matches the mnemonic, ignoring case.
    pub fn matches_mnemonic(&self, key: char) -> bool {
        self.mnemonic()
            .is_some_and(|mnemonic| chars_eq_ignore_case(mnemonic, key))
    }

    /// Text with mnemonic markers removed.
    pub fn display_text(&self) -> String {
        self.text.with(|text| parse_mnemonic(text).display_text)
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Set the item type.
    pub fn set_type(&self, item_type: ItemType) {
        if let Some(old) = self.item_type.replace(item_type) {
            self.notify(ItemField::Type, ItemValue::Type(old), ItemValue::Type(item_type));
        }
    }

    /// Set the text.
    pub fn set_text(&self, text: impl Into<String>) {
        self.set_string(&self.text, ItemField::Text, text.into());
    }

    /// Set the icon class.
    pub fn set_icon(&self, icon: impl Into<String>) {
        self.set_string(&self.icon, ItemField::Icon, icon.into());
    }

    /// Set the shortcut label.
    pub fn set_shortcut(&self, shortcut: impl Into<String>) {
        self.set_string(&self.shortcut, ItemField::Shortcut, shortcut.into());
    }

    /// Set the extra class names.
    pub fn set_class_name(&self, class_name: impl Into<String>) {
        self.set_string(&self.class_name, ItemField::ClassName, class_name.into());
    }

    /// Set the disabled flag.
    pub fn set_disabled(&self, disabled: bool) {
        self.set_flag(&self.disabled, ItemField::Disabled, disabled);
    }

    /// Set the checked flag.
    pub fn set_checked(&self, checked: bool) {
        self.set_flag(&self.checked, ItemField::Checked, checked);
    }

    /// Set the hidden flag.
    pub fn set_hidden(&self, hidden: bool) {
        self.set_flag(&self.hidden, ItemField::Hidden, hidden);
    }

    /// Bind or clear the command.
    pub fn set_command(&self, command: Option<CommandRef>) {
        if let Some(old) = self.command.replace(command.clone()) {
            self.notify(
                ItemField::Command,
                ItemValue::Command(old),
                ItemValue::Command(command),
            );
        }
    }

    /// Set the command arguments.
    pub fn set_command_args(&self, args: Value) {
        if let Some(old) = self.command_args.replace(args.clone()) {
            self.notify(ItemField::CommandArgs, ItemValue::Args(old), ItemValue::Args(args));
        }
    }

    /// Set or clear the trigger callback.
    pub fn set_handler(&self, handler: Option<Handler>) {
        if let Some(old) = self.handler.replace(handler.clone()) {
            self.notify(
                ItemField::Handler,
                ItemValue::Handler(old),
                ItemValue::Handler(handler),
            );
        }
    }

    /// Attach or detach a submenu.
    ///
    /// Attaching to a normal item makes it a submenu item; detaching from a
    /// submenu item makes it normal again. The submenu change is published
    /// before the resulting type change.
    pub fn set_submenu(&self, submenu: Option<MenuId>) {
        let Some(old) = self.submenu.replace(submenu) else {
            return;
        };
        self.notify(
            ItemField::Submenu,
            ItemValue::Submenu(old),
            ItemValue::Submenu(submenu),
        );

        match (submenu.is_some(), self.item_type()) {
            (true, ItemType::Normal) => self.set_type(ItemType::Submenu),
            (false, ItemType::Submenu) => self.set_type(ItemType::Normal),
            _ => {}
        }
    }

    fn set_string(&self, property: &Property<String>, field: ItemField, value: String) {
        if let Some(old) = property.replace(value.clone()) {
            self.notify(field, ItemValue::Text(old), ItemValue::Text(value));
        }
    }

    fn set_flag(&self, property: &Property<bool>, field: ItemField, value: bool) {
        if let Some(old) = property.replace(value) {
            self.notify(field, ItemValue::Flag(old), ItemValue::Flag(value));
        }
    }

    fn notify(&self, field: ItemField, old: ItemValue, new: ItemValue) {
        self.changed.emit(ItemChanged { field, old, new });
    }
}

impl Default for MenuItem {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("type", &self.item_type())
            .field("text", &self.text())
            .field("disabled", &self.is_disabled())
            .field("hidden", &self.is_hidden())
            .field("submenu", &self.submenu())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(MenuItem: Send, Sync);
