use serde::{Deserialize, Serialize};

/// Contiene una celda especifica de la grilla sobre la que se mueven los drones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> GridPosition {
        GridPosition { x, y }
    }

    /// Avanza una celda hacia `target`. Si difieren ambos ejes, se mueve en diagonal.
    pub fn step_towards(&self, target: &GridPosition) -> GridPosition {
        GridPosition {
            x: self.x + (target.x - self.x).signum(),
            y: self.y + (target.y - self.y).signum(),
        }
    }

    /// Cantidad de pasos necesarios para llegar a `target` (cada diagonal cuenta uno).
    pub fn steps_to(&self, target: &GridPosition) -> u32 {
        let dx = (target.x - self.x).unsigned_abs();
        let dy = (target.y - self.y).unsigned_abs();
        dx.max(dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_01_step_moves_diagonally_then_straight() {
        let target = GridPosition::new(3, 1);
        let mut position = GridPosition::new(0, 0);

        position = position.step_towards(&target);
        assert_eq!(position, GridPosition::new(1, 1));
        position = position.step_towards(&target);
        assert_eq!(position, GridPosition::new(2, 1));
        position = position.step_towards(&target);
        assert_eq!(position, target);
        assert_eq!(position.step_towards(&target), target);
    }

    #[test]
    fn test_02_steps_to() {
        let origin = GridPosition::default();
        assert_eq!(origin.steps_to(&GridPosition::new(22, 7)), 22);
        assert_eq!(GridPosition::new(5, -2).steps_to(&origin), 5);
        assert_eq!(origin.steps_to(&origin), 0);
    }
}
