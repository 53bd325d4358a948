#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum VREye {
    Left,
    Right,
}

impl VREye {
    pub fn index(&self) -> usize {
        match *self {
            VREye::Left => 0,
            VREye::Right => 1,
        }
    }

    pub fn other(&self) -> VREye {
        match *self {
            VREye::Left => VREye::Right,
            VREye::Right => VREye::Left,
        }
    }
}

// Which eyes a per-eye device report (tracked, closed) applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum VREyes {
    Neither,
    Left,
    Right,
    Both,
}

impl VREyes {
    pub fn contains(&self, eye: VREye) -> bool {
        match (*self, eye) {
            (VREyes::Both, _) => true,
            (VREyes::Left, VREye::Left) => true,
            (VREyes::Right, VREye::Right) => true,
            _ => false,
        }
    }

    pub fn left(&self) -> bool {
        self.contains(VREye::Left)
    }

    pub fn right(&self) -> bool {
        self.contains(VREye::Right)
    }
}

impl Default for VREyes {
    fn default() -> VREyes {
        VREyes::Neither
    }
}
