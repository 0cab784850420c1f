/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,

    // Focus
    FocusNext,
    FocusPrev,
    FocusDatabases,
    FocusSearch,
    FocusKeys,

    // List navigation
    ListUp,
    ListDown,
    ListSelect,

    // Databases
    SelectDatabase(String),
    RefreshDatabases,

    // Key listing
    NextPage,
    PrevPage,
    RefreshKeys,

    // Prefix search
    SearchInput(char),
    SearchBackspace,
    SearchSubmit,
    SearchClear,

    // Dialogs
    ViewKey,
    EditFromView,
    AddKey,
    DeleteKey,
    CloseDialog,
    ConfirmAccept,

    // Edit form
    FormInput(char),
    FormBackspace,
    FormNewline,
    FormNextField,
    FormClearField,
    FormSubmit,

    /// Bracketed paste into whichever text field has focus
    Paste(String),

    // UI toggles
    ToggleHelp,
    DismissNotice,
}
