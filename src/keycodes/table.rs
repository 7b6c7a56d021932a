//! Scancode name table (PC set 1, as reported by the OS keyboard hook)

/// `(scancode, display name, extra lowercase aliases)`
pub(super) const KEY_NAMES: &[(u16, &str, &[&str])] = &[
    (1, "Esc", &["escape"]),
    (2, "1", &[]),
    (3, "2", &[]),
    (4, "3", &[]),
    (5, "4", &[]),
    (6, "5", &[]),
    (7, "6", &[]),
    (8, "7", &[]),
    (9, "8", &[]),
    (10, "9", &[]),
    (11, "0", &[]),
    (12, "-", &["minus"]),
    (13, "=", &["equal", "equals"]),
    (14, "Backspace", &["back"]),
    (15, "Tab", &[]),
    (16, "Q", &[]),
    (17, "W", &[]),
    (18, "E", &[]),
    (19, "R", &[]),
    (20, "T", &[]),
    (21, "Y", &[]),
    (22, "U", &[]),
    (23, "I", &[]),
    (24, "O", &[]),
    (25, "P", &[]),
    (26, "[", &["lbracket"]),
    (27, "]", &["rbracket"]),
    (28, "Enter", &["return"]),
    (29, "Ctrl", &["control", "lctrl"]),
    (30, "A", &[]),
    (31, "S", &[]),
    (32, "D", &[]),
    (33, "F", &[]),
    (34, "G", &[]),
    (35, "H", &[]),
    (36, "J", &[]),
    (37, "K", &[]),
    (38, "L", &[]),
    (39, ";", &["semicolon"]),
    (40, "'", &["quote", "apostrophe"]),
    (41, "`", &["backtick", "grave"]),
    (42, "Shift", &["lshift"]),
    (43, "\\", &["backslash"]),
    (44, "Z", &[]),
    (45, "X", &[]),
    (46, "C", &[]),
    (47, "V", &[]),
    (48, "B", &[]),
    (49, "N", &[]),
    (50, "M", &[]),
    (51, ",", &["comma"]),
    (52, ".", &["period", "dot"]),
    (53, "/", &["slash"]),
    (54, "RShift", &["right_shift"]),
    (55, "Num*", &["numpad_multiply", "nummul"]),
    (56, "Alt", &["lalt"]),
    (57, "Space", &[]),
    (58, "CapsLock", &["caps"]),
    (59, "F1", &[]),
    (60, "F2", &[]),
    (61, "F3", &[]),
    (62, "F4", &[]),
    (63, "F5", &[]),
    (64, "F6", &[]),
    (65, "F7", &[]),
    (66, "F8", &[]),
    (67, "F9", &[]),
    (68, "F10", &[]),
    (69, "NumLock", &[]),
    (70, "ScrollLock", &[]),
    (71, "Num7", &["numpad7"]),
    (72, "Num8", &["numpad8"]),
    (73, "Num9", &["numpad9"]),
    (74, "Num-", &["numpad_subtract", "numsub", "numminus"]),
    (75, "Num4", &["numpad4"]),
    (76, "Num5", &["numpad5"]),
    (77, "Num6", &["numpad6"]),
    (78, "Num+", &["numpad_add", "numadd", "numplus"]),
    (79, "Num1", &["numpad1"]),
    (80, "Num2", &["numpad2"]),
    (81, "Num3", &["numpad3"]),
    (82, "Num0", &["numpad0"]),
    (83, "Num.", &["numpad_decimal", "numdot"]),
    (87, "F11", &[]),
    (88, "F12", &[]),
];

/// Characters typed with Shift held, mapped to the key they share.
/// Uppercase ASCII letters are handled separately.
pub(super) const SHIFTED: &[(char, char)] = &[
    ('!', '1'),
    ('@', '2'),
    ('#', '3'),
    ('$', '4'),
    ('%', '5'),
    ('^', '6'),
    ('&', '7'),
    ('*', '8'),
    ('(', '9'),
    (')', '0'),
    ('_', '-'),
    ('+', '='),
    ('{', '['),
    ('}', ']'),
    ('|', '\\'),
    (':', ';'),
    ('"', '\''),
    ('<', ','),
    ('>', '.'),
    ('?', '/'),
    ('~', '`'),
];
