use serde::Serialize;

/// A sound cue emitted by the simulation.
/// The identifier maps to a game-defined sample in the host's sound manager;
/// the engine never knows whether (or how) it is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SoundEvent(pub &'static str);

impl SoundEvent {
    pub const JUMP: SoundEvent = SoundEvent("jump");
    pub const STOMP: SoundEvent = SoundEvent("stomp");
    pub const COIN: SoundEvent = SoundEvent("coin");
    pub const BUMP: SoundEvent = SoundEvent("bump");
    pub const BRICK: SoundEvent = SoundEvent("brick");
    pub const POWERUP_APPEAR: SoundEvent = SoundEvent("powerup_appear");
    pub const POWERUP: SoundEvent = SoundEvent("powerup");
    /// Damage taken (tier drop or forced dismount) and warp arrival.
    pub const PIPE: SoundEvent = SoundEvent("pipe");
    pub const FIREBALL: SoundEvent = SoundEvent("fireball");
    pub const KICK: SoundEvent = SoundEvent("kick");
    pub const ONE_UP: SoundEvent = SoundEvent("one_up");
    pub const DIE: SoundEvent = SoundEvent("die");
    pub const GAME_OVER: SoundEvent = SoundEvent("game_over");
    pub const FLAG: SoundEvent = SoundEvent("flag");
    pub const BOSS_HIT: SoundEvent = SoundEvent("boss_hit");
    pub const BOSS_POUND: SoundEvent = SoundEvent("boss_pound");
    pub const BOSS_DEFEAT: SoundEvent = SoundEvent("boss_defeat");
    pub const MOUNT: SoundEvent = SoundEvent("mount");
    pub const TONGUE: SoundEvent = SoundEvent("tongue");
    pub const SLAM: SoundEvent = SoundEvent("slam");
    pub const DIG: SoundEvent = SoundEvent("dig");
    pub const WARP: SoundEvent = SoundEvent("warp");
    pub const HURRY: SoundEvent = SoundEvent("hurry");
    pub const SELECT: SoundEvent = SoundEvent("select");
    pub const CONFIRM: SoundEvent = SoundEvent("confirm");

    /// The identifier string handed to the host.
    pub fn id(&self) -> &'static str {
        self.0
    }
}
