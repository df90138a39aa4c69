/*!
Semantic UI roles.

Roles describe what an element *is*. The wire protocol numbers its roles and
has grown the list over revisions; [`Role::from_wire`] folds those codes into
this closed, stable set.
*/

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Library role, stable across protocol revisions.
///
/// Wire roles with no counterpart here translate to [`Role::NoRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
  /// Unknown or unmapped wire role.
  #[default]
  NoRole,

  // === Top level ===
  Application,
  Window,
  Frame,
  Dialog,
  Alert,
  Notification,
  DesktopFrame,
  DesktopIcon,

  // === Containers ===
  Panel,
  Filler,
  Grouping,
  Form,
  Section,
  ScrollArea,
  ScrollBar,
  SplitPane,
  ToolBar,
  StatusBar,
  TabContainer,
  Tab,
  Document,

  // === Menus ===
  MenuBar,
  Menu,
  PopupMenu,
  MenuItem,
  CheckableMenuItem,
  RadioMenuItem,

  // === Collections ===
  ListView,
  ListItem,
  TreeView,
  TreeItem,
  TableView,
  TableRow,
  TableCell,
  TableColumnHeader,
  TableRowHeader,
  ColumnHeader,
  RowHeader,

  // === Controls ===
  Button,
  ToggleButton,
  CheckBox,
  RadioButton,
  ComboBox,
  SpinButton,
  Slider,
  Dial,
  ProgressBar,
  ColorChooser,
  DateEditor,
  FileChooser,
  Link,

  // === Text ===
  Text,
  PasswordText,
  Terminal,
  Label,
  Caption,
  Heading,
  Paragraph,
  ToolTip,

  // === Graphics ===
  Canvas,
  Image,
  Icon,
  Separator,
}

impl Role {
  /// Translate a wire role code. Unknown codes map to [`Role::NoRole`].
  ///
  /// ```
  /// use atspio::a11y::Role;
  ///
  /// assert_eq!(Role::from_wire(43), Role::Button);
  /// assert_eq!(Role::from_wire(9999), Role::NoRole);
  /// ```
  pub const fn from_wire(code: u32) -> Self {
    match code {
      1 | 29 => Self::Label,
      2 => Self::Alert,
      3 | 27 => Self::Image,
      5 | 12 => Self::DateEditor,
      6 | 18 => Self::Canvas,
      7 => Self::CheckBox,
      8 => Self::CheckableMenuItem,
      9 => Self::ColorChooser,
      10 => Self::ColumnHeader,
      11 => Self::ComboBox,
      13 => Self::DesktopIcon,
      14 => Self::DesktopFrame,
      15 => Self::Dial,
      16 => Self::Dialog,
      17 | 19 => Self::FileChooser,
      20 => Self::Filler,
      23 | 28 => Self::Frame,
      26 => Self::Icon,
      31 | 98 => Self::ListView,
      32 => Self::ListItem,
      33 => Self::Menu,
      34 => Self::MenuBar,
      35 | 59 => Self::MenuItem,
      37 => Self::Tab,
      38 => Self::TabContainer,
      39 => Self::Panel,
      40 => Self::PasswordText,
      41 => Self::PopupMenu,
      42 => Self::ProgressBar,
      43 => Self::Button,
      44 => Self::RadioButton,
      45 => Self::RadioMenuItem,
      47 => Self::RowHeader,
      48 => Self::ScrollBar,
      49 | 68 => Self::ScrollArea,
      50 => Self::Separator,
      51 => Self::Slider,
      52 => Self::SpinButton,
      53 => Self::SplitPane,
      54 => Self::StatusBar,
      55 => Self::TableView,
      56 => Self::TableCell,
      57 => Self::TableColumnHeader,
      58 => Self::TableRowHeader,
      60 => Self::Terminal,
      61 | 79 => Self::Text,
      62 => Self::ToggleButton,
      63 => Self::ToolBar,
      64 => Self::ToolTip,
      65 | 66 => Self::TreeView,
      69 => Self::Window,
      73 => Self::Paragraph,
      75 => Self::Application,
      81 => Self::Caption,
      82 | 92..=96 => Self::Document,
      83 => Self::Heading,
      85 => Self::Section,
      87 => Self::Form,
      88 => Self::Link,
      90 => Self::TableRow,
      91 => Self::TreeItem,
      99 => Self::Grouping,
      101 => Self::Notification,
      _ => Self::NoRole,
    }
  }
}
